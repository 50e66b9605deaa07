//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for hisseed using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Hisseed - Deterministic DHIS2 metadata and data bootstrapper
#[derive(Parser, Debug)]
#[command(name = "hisseed")]
#[command(version, about, long_about = None)]
#[command(author = "Hisseed Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hisseed.toml", env = "HISSEED_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HISSEED_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full bootstrap against the configured target
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Print reproducible identifiers for a seed
    GenerateIds(commands::generate_ids::GenerateIdsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["hisseed", "run"]);
        assert_eq!(cli.config, "hisseed.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["hisseed", "--config", "custom.toml", "run", "--yes"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Run(ref args) if args.yes));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["hisseed", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["hisseed", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["hisseed", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }

    #[test]
    fn test_cli_parse_generate_ids() {
        let cli = Cli::parse_from(["hisseed", "generate-ids", "--count", "5", "--seed", "7"]);
        match cli.command {
            Commands::GenerateIds(args) => {
                assert_eq!(args.count, 5);
                assert_eq!(args.seed, 7);
                assert_eq!(args.length, 11);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
