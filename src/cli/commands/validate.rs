//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the hisseed configuration file.

use super::exit_code;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates, so a loaded file is a valid one.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Target: {}", config.target.base_url);
        println!("  Username: {}", config.target.username);
        println!("  Import Strategy: {}", config.import.import_strategy);
        println!(
            "  Identifiers: seed {}, length {}",
            config.identifiers.seed, config.identifiers.length
        );
        println!("  Organisation Units: {}", config.sources.org_units);
        println!(
            "  Users: {}",
            config.sources.users.as_deref().unwrap_or("(none)")
        );
        println!("  Data Dictionary: {}", config.sources.data_dictionary);
        for dataset in &config.sources.datasets {
            println!(
                "  Dataset '{}': {} ({:?} layout)",
                dataset.name, dataset.location, dataset.layout
            );
        }
        println!(
            "  Recompute: {} (every {} ms, at most {} polls)",
            config.recompute.task_type,
            config.recompute.poll_interval_ms,
            config.recompute.max_polls
        );
        println!();
        Ok(exit_code::SUCCESS)
    }
}
