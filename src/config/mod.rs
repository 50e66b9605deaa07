//! Configuration management for hisseed.
//!
//! # Overview
//!
//! hisseed reads one TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `HISSEED_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation before anything touches the network
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hisseed::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hisseed.toml")?;
//!
//! println!("Target: {}", config.target.base_url);
//! println!("Seed: {}", config.identifiers.seed);
//! for dataset in &config.sources.datasets {
//!     println!("Dataset: {} ({})", dataset.name, dataset.location);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`TargetConfig`] - Instance URL and credentials
//! - [`ImportConfig`] - Import strategy, atomic mode, strict joins
//! - [`IdentifierConfig`] - Seed and identifier length
//! - [`SourcesConfig`] - Org units, users, dictionary and datasets
//! - [`MetadataConfig`] - Opening date, level names, user role, defaults
//! - [`RecomputeConfig`] - Analytics task polling
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [target]
//! base_url = "http://localhost:8080"
//! username = "admin"
//! password = "${HISSEED_TARGET_PASSWORD}"
//!
//! [identifiers]
//! seed = 42
//!
//! [sources]
//! org_units = "https://example.org/who_regions.geojson"
//! data_dictionary = "https://example.org/TB_data_dictionary.csv"
//!
//! [[sources.datasets]]
//! name = "TB burden"
//! location = "https://example.org/TB_burden_countries.csv"
//! id_columns = ["country", "iso3", "year"]
//! org_unit_column = "iso3"
//! period_column = "year"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, AtomicMode, DatasetConfig, DatasetLayout, IdentifierConfig, ImportConfig,
    ImportStrategy, LoggingConfig, MetadataConfig, RecomputeConfig, SeedConfig, SourcesConfig,
    TargetConfig, UserRoleConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
