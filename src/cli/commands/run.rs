//! Run command implementation
//!
//! This module implements the `run` command, which executes a full bootstrap
//! against the configured target.

use super::exit_code;
use crate::adapters::dhis2::Dhis2Client;
use crate::adapters::sources::SourceFetcher;
use crate::config::load_config;
use crate::core::bootstrap::{BootstrapSummary, Bootstrapper};
use crate::domain::SeedError;
use clap::Args;
use std::time::Duration;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Override the identifier seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fail when a join drops rows instead of warning
    #[arg(long)]
    pub strict: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration load failed");
                eprintln!("Configuration error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        if let Some(seed) = self.seed {
            tracing::info!(seed, "Overriding identifier seed from CLI");
            config.identifiers.seed = seed;
        }
        if self.strict {
            tracing::info!("Enabling strict join mode from CLI");
            config.import.fail_on_join_mismatch = true;
        }

        if !self.yes {
            println!("Bootstrap Configuration:");
            println!("  Target: {}", config.target.base_url);
            println!("  Import strategy: {}", config.import.import_strategy);
            println!("  Identifier seed: {}", config.identifiers.seed);
            println!("  Datasets: {}", config.sources.datasets.len());
            println!();
            print!("Proceed with bootstrap? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Bootstrap cancelled.");
                return Ok(exit_code::SUCCESS);
            }
        }

        let timeout = Duration::from_secs(config.target.timeout_seconds);
        let api = Dhis2Client::new(&config.target)?;
        let source = SourceFetcher::new(timeout)?;
        let bootstrapper = Bootstrapper::new(config, api, source);

        println!("🚀 Starting bootstrap...");
        println!();

        match bootstrapper.run().await {
            Ok(summary) => {
                print_summary(&summary);
                println!("✅ Bootstrap completed successfully!");
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                eprintln!("❌ Bootstrap failed: {e}");
                if let Some(stage) = e.failed_stage() {
                    eprintln!("   Fix the input and rerun; {stage} and later stages did not complete.");
                }
                Ok(failure_exit_code(&e))
            }
        }
    }
}

/// Maps a run failure to an exit code
pub fn failure_exit_code(error: &SeedError) -> i32 {
    match error.root_cause() {
        SeedError::Configuration(_) => exit_code::CONFIGURATION,
        _ if error.failed_stage().is_some() => exit_code::STAGE_FAILED,
        _ => exit_code::FATAL,
    }
}

fn print_summary(summary: &BootstrapSummary) {
    println!();
    println!("📊 Bootstrap Summary:");
    println!("  Stages completed: {}", summary.stages_completed.len());
    for (object_type, count) in &summary.imported {
        println!("  {object_type}: {count}");
    }
    println!("  Rows dropped by joins: {}", summary.dropped_rows());
    println!("  Status requests: {}", summary.polls);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.checksums.is_empty() {
        println!("🔐 Payload checksums:");
        for (object_type, checksum) in &summary.checksums {
            println!("  {object_type}: {checksum}");
        }
        println!();
    }
}
