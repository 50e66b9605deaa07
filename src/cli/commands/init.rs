//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "hisseed.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing hisseed configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION);
        }

        match fs::write(&self.output, sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your sources and datasets", self.output);
                println!("  2. Set HISSEED_TARGET_PASSWORD in the environment or a .env file");
                println!("  3. Validate configuration: hisseed validate-config");
                println!("  4. Run the bootstrap: hisseed run");
                println!();
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_code::FATAL)
            }
        }
    }
}

/// Sample configuration written by `init`
pub fn sample_config() -> &'static str {
    r#"# Hisseed Configuration File
# Environment variables can be referenced as ${VAR_NAME}; every key can also be
# overridden with HISSEED_<SECTION>_<KEY>.

[application]
log_level = "info"

[target]
base_url = "http://localhost:8080"
username = "admin"
# Prefer HISSEED_TARGET_PASSWORD over a literal password
password = "district"
timeout_seconds = 120
tls_verify = true

[import]
# CREATE, UPDATE or CREATE_AND_UPDATE
import_strategy = "CREATE"
# ALL or NONE
atomic_mode = "ALL"
# Fail instead of warning when a join drops rows
fail_on_join_mismatch = false

[identifiers]
seed = 42
length = 11

[sources]
org_units = "data/org_units.geojson"
# users = "data/users.csv"
data_dictionary = "data/data_dictionary.csv"
dictionary_code_column = "variable_name"
dictionary_definition_column = "definition"
na_values = ["NA", ""]

[[sources.datasets]]
name = "TB burden estimates"
location = "data/tb_burden.csv"
id_columns = ["iso3", "year"]
org_unit_column = "iso3"
period_column = "year"
exclude_columns = ["country", "iso2", "iso_numeric", "g_whoregion"]
layout = "variables"

[metadata]
opening_date = "1970-01-01"
org_unit_level_names = ["World", "Region", "Country"]
value_type = "NUMBER"
aggregation_type = "SUM"
# Required when sources.users is set
# default_user_password = "${HISSEED_DEFAULT_USER_PASSWORD}"
# Fixed created/lastUpdated stamp, for reproducible XML payloads
# timestamp = "2024-01-01T00:00:00Z"

[metadata.user_role]
name = "Seeded analyst"
code = "SEEDED_ANALYST"
authorities = ["ALL"]

[recompute]
task_type = "ANALYTICS_TABLE"
poll_interval_ms = 5000
max_polls = 360

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
}
