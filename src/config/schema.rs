//! Configuration schema types
//!
//! This module defines the configuration structure for hisseed. Every section
//! maps to one table of `hisseed.toml`.

use crate::config::SecretString;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Import strategy passed to the metadata endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStrategy {
    /// Create new objects only
    #[default]
    Create,
    /// Update existing objects only
    Update,
    /// Create or update
    CreateAndUpdate,
}

impl ImportStrategy {
    /// Query parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStrategy::Create => "CREATE",
            ImportStrategy::Update => "UPDATE",
            ImportStrategy::CreateAndUpdate => "CREATE_AND_UPDATE",
        }
    }
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomicity of a metadata import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtomicMode {
    /// Reject the whole import if any object fails validation
    #[default]
    All,
    /// Import every object that validates
    None,
}

impl AtomicMode {
    /// Query parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            AtomicMode::All => "ALL",
            AtomicMode::None => "NONE",
        }
    }
}

impl fmt::Display for AtomicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a wide dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatasetLayout {
    /// Every variable column is a data element code; the period is an id column
    #[default]
    Variables,
    /// Every variable column is a period; the data element is fixed per dataset
    Periods,
}

/// Main hisseed configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Target instance connection
    pub target: TargetConfig,

    /// Import behaviour
    #[serde(default)]
    pub import: ImportConfig,

    /// Identifier generation
    #[serde(default)]
    pub identifiers: IdentifierConfig,

    /// Upstream files
    pub sources: SourcesConfig,

    /// Metadata defaults
    #[serde(default)]
    pub metadata: MetadataConfig,

    /// Analytics recompute polling
    #[serde(default)]
    pub recompute: RecomputeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SeedConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.target.validate()?;
        self.identifiers.validate()?;
        self.sources.validate()?;
        self.metadata.validate(self.sources.users.is_some())?;
        self.recompute.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Target instance connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Base URL of the instance, without the `/api` suffix
    pub base_url: String,

    /// Username for basic authentication
    pub username: String,

    /// Password for basic authentication
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Only disable this against a local development instance with a
    /// self-signed certificate.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl TargetConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err("target.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("target.base_url must start with http:// or https://".to_string());
        }

        if self.username.is_empty() {
            return Err("target.username cannot be empty".to_string());
        }

        if self.password.expose_secret().is_empty() {
            return Err("target.password cannot be empty".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("target.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Import behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImportConfig {
    /// Strategy for metadata imports other than the user update
    #[serde(default)]
    pub import_strategy: ImportStrategy,

    /// Atomicity of metadata imports
    #[serde(default)]
    pub atomic_mode: AtomicMode,

    /// Fail the run when an inner join drops rows instead of warning
    #[serde(default)]
    pub fail_on_join_mismatch: bool,
}

/// Identifier generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierConfig {
    /// Seed of the identifier stream
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Identifier length
    #[serde(default = "default_uid_length")]
    pub length: usize,
}

impl IdentifierConfig {
    fn validate(&self) -> Result<(), String> {
        if self.length < 2 {
            return Err(format!(
                "identifiers.length must be >= 2, got {}",
                self.length
            ));
        }
        Ok(())
    }
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            length: default_uid_length(),
        }
    }
}

/// Upstream files
///
/// Every location is either an `http(s)://` URL or a local path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Organisation units (JSON array, `{"organisationUnits": [...]}` or GeoJSON)
    pub org_units: String,

    /// User roster CSV (`firstName,surname,username[,email][,orgUnit]`)
    #[serde(default)]
    pub users: Option<String>,

    /// Data dictionary CSV
    pub data_dictionary: String,

    /// Dictionary column holding the variable code
    #[serde(default = "default_dictionary_code_column")]
    pub dictionary_code_column: String,

    /// Dictionary column holding the definition
    #[serde(default = "default_dictionary_definition_column")]
    pub dictionary_definition_column: String,

    /// Optional dictionary column naming the dataset a variable belongs to
    #[serde(default)]
    pub dictionary_dataset_column: Option<String>,

    /// Cell values treated as missing
    #[serde(default = "default_na_values")]
    pub na_values: Vec<String>,

    /// Wide datasets to reshape and import as data values
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
}

impl SourcesConfig {
    fn validate(&self) -> Result<(), String> {
        if self.org_units.is_empty() {
            return Err("sources.org_units cannot be empty".to_string());
        }
        if self.data_dictionary.is_empty() {
            return Err("sources.data_dictionary cannot be empty".to_string());
        }

        let mut names = std::collections::HashSet::new();
        for dataset in &self.datasets {
            dataset.validate()?;
            if !names.insert(dataset.name.as_str()) {
                return Err(format!(
                    "sources.datasets: duplicate dataset name '{}'",
                    dataset.name
                ));
            }
        }
        Ok(())
    }
}

/// One wide dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset name, also the data element group name unless `group_name` is set
    pub name: String,

    /// URL or path of the CSV file
    pub location: String,

    /// Columns that identify a row; every other column is a variable
    pub id_columns: Vec<String>,

    /// Id column holding the organisation unit code
    pub org_unit_column: String,

    /// Columns dropped before reshaping
    #[serde(default)]
    pub exclude_columns: Vec<String>,

    /// What the variable columns mean
    #[serde(default)]
    pub layout: DatasetLayout,

    /// Id column holding the period (`variables` layout)
    #[serde(default)]
    pub period_column: Option<String>,

    /// Data element code every value belongs to (`periods` layout)
    #[serde(default)]
    pub data_element: Option<String>,

    /// Prefix stripped from period column names (`periods` layout)
    #[serde(default)]
    pub period_prefix: String,

    /// Name of the data element group for this dataset
    #[serde(default)]
    pub group_name: Option<String>,
}

impl DatasetConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("sources.datasets.name cannot be empty".to_string());
        }
        if self.location.is_empty() {
            return Err(format!(
                "sources.datasets '{}': location cannot be empty",
                self.name
            ));
        }
        if !self.id_columns.contains(&self.org_unit_column) {
            return Err(format!(
                "sources.datasets '{}': org_unit_column '{}' must be one of id_columns",
                self.name, self.org_unit_column
            ));
        }

        match self.layout {
            DatasetLayout::Variables => match &self.period_column {
                Some(period) if self.id_columns.contains(period) => Ok(()),
                Some(period) => Err(format!(
                    "sources.datasets '{}': period_column '{}' must be one of id_columns",
                    self.name, period
                )),
                None => Err(format!(
                    "sources.datasets '{}': period_column is required for layout 'variables'",
                    self.name
                )),
            },
            DatasetLayout::Periods => match &self.data_element {
                Some(code) if !code.is_empty() => Ok(()),
                _ => Err(format!(
                    "sources.datasets '{}': data_element is required for layout 'periods'",
                    self.name
                )),
            },
        }
    }

    /// Data element group name
    pub fn group_name(&self) -> &str {
        self.group_name.as_deref().unwrap_or(&self.name)
    }
}

/// User role created for the seeded users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleConfig {
    #[serde(default = "default_role_name")]
    pub name: String,

    #[serde(default = "default_role_code")]
    pub code: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_authorities")]
    pub authorities: Vec<String>,
}

impl Default for UserRoleConfig {
    fn default() -> Self {
        Self {
            name: default_role_name(),
            code: default_role_code(),
            description: None,
            authorities: default_authorities(),
        }
    }
}

/// Metadata defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Opening date of every organisation unit (`YYYY-MM-DD`)
    #[serde(default = "default_opening_date")]
    pub opening_date: String,

    /// Names of the hierarchy levels, top first; missing names become `Level N`
    #[serde(default)]
    pub org_unit_level_names: Vec<String>,

    #[serde(default)]
    pub user_role: UserRoleConfig,

    /// Initial password of every seeded user
    #[serde(default)]
    pub default_user_password: Option<SecretString>,

    #[serde(default = "default_value_type")]
    pub value_type: String,

    #[serde(default = "default_aggregation_type")]
    pub aggregation_type: String,

    /// RFC 3339 `created`/`lastUpdated` stamp of XML payloads; the current
    /// time when unset
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl MetadataConfig {
    fn validate(&self, has_users: bool) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if chrono::NaiveDate::parse_from_str(&self.opening_date, "%Y-%m-%d").is_err() {
            return Err(format!(
                "metadata.opening_date must be YYYY-MM-DD, got '{}'",
                self.opening_date
            ));
        }

        if self.user_role.name.is_empty() || self.user_role.code.is_empty() {
            return Err("metadata.user_role name and code cannot be empty".to_string());
        }

        if let Some(timestamp) = &self.timestamp {
            if DateTime::parse_from_rfc3339(timestamp).is_err() {
                return Err(format!(
                    "metadata.timestamp must be RFC 3339, got '{timestamp}'"
                ));
            }
        }

        let has_password = self
            .default_user_password
            .as_ref()
            .map(|p| !p.expose_secret().is_empty())
            .unwrap_or(false);
        if has_users && !has_password {
            return Err(
                "metadata.default_user_password is required when sources.users is set"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Stamp for XML payloads
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now)
    }

    /// Name of hierarchy level `level` (1-based)
    pub fn level_name(&self, level: usize) -> String {
        self.org_unit_level_names
            .get(level.saturating_sub(1))
            .cloned()
            .unwrap_or_else(|| format!("Level {level}"))
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            opening_date: default_opening_date(),
            org_unit_level_names: Vec::new(),
            user_role: UserRoleConfig::default(),
            default_user_password: None,
            value_type: default_value_type(),
            aggregation_type: default_aggregation_type(),
            timestamp: None,
        }
    }
}

/// Analytics recompute polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeConfig {
    /// Task type polled under `/api/system/tasks/`
    #[serde(default = "default_task_type")]
    pub task_type: String,

    /// Delay between status requests in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Status requests before giving up
    #[serde(default = "default_max_polls")]
    pub max_polls: usize,
}

impl RecomputeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.task_type.is_empty() {
            return Err("recompute.task_type cannot be empty".to_string());
        }
        if self.max_polls == 0 {
            return Err("recompute.max_polls must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for RecomputeConfig {
    fn default() -> Self {
        Self {
            task_type: default_task_type(),
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory of the log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_seed() -> u64 {
    42
}

fn default_uid_length() -> usize {
    crate::domain::DEFAULT_UID_LENGTH
}

fn default_dictionary_code_column() -> String {
    "variable_name".to_string()
}

fn default_dictionary_definition_column() -> String {
    "definition".to_string()
}

fn default_na_values() -> Vec<String> {
    vec!["NA".to_string(), String::new()]
}

fn default_role_name() -> String {
    "Seeded analyst".to_string()
}

fn default_role_code() -> String {
    "SEEDED_ANALYST".to_string()
}

fn default_authorities() -> Vec<String> {
    vec!["ALL".to_string()]
}

fn default_opening_date() -> String {
    "1970-01-01".to_string()
}

fn default_value_type() -> String {
    crate::domain::data_element::DEFAULT_VALUE_TYPE.to_string()
}

fn default_aggregation_type() -> String {
    crate::domain::data_element::DEFAULT_AGGREGATION_TYPE.to_string()
}

fn default_task_type() -> String {
    "ANALYTICS_TABLE".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_max_polls() -> usize {
    360
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
