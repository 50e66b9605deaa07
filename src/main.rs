// Hisseed - Deterministic DHIS2 metadata and data bootstrapper
// Copyright (c) 2025 Hisseed Contributors
// Licensed under the MIT License

use hisseed::cli::commands::exit_code;
use hisseed::cli::{Cli, Commands};
use hisseed::config::{load_config, LoggingConfig};
use hisseed::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Commands report their own configuration errors; here the file only
    // contributes the log level and file logging settings
    let file_config = load_config(&cli.config).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = file_config.map(|c| c.logging).unwrap_or_default();

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(exit_code::FATAL);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Hisseed - DHIS2 metadata and data bootstrapper"
    );

    let code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            exit_code::FATAL
        }
    };

    // process::exit skips destructors, so flush the file writer first
    drop(guard);
    process::exit(code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
        Commands::GenerateIds(args) => args.execute().await,
    }
}
