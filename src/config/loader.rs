//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SeedConfig;
use super::secret::secret_string;
use crate::domain::errors::SeedError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`SeedConfig`]
/// 4. Applies environment variable overrides (`HISSEED_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`SeedError::Configuration`] if the file cannot be read, a
/// referenced variable is unset, parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use hisseed::config::load_config;
///
/// let config = load_config("hisseed.toml")?;
/// println!("Target: {}", config.target.base_url);
/// # Ok::<(), hisseed::domain::SeedError>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SeedConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SeedError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SeedError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses, overrides and validates configuration text
pub fn parse_config(contents: &str) -> Result<SeedConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SeedConfig = toml::from_str(&contents)
        .map_err(|e| SeedError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        SeedError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SeedError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SeedError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        SeedError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using the `HISSEED_*` prefix
///
/// Variables follow the pattern `HISSEED_<SECTION>_<KEY>`, for example
/// `HISSEED_TARGET_BASE_URL` or `HISSEED_IDENTIFIERS_SEED`.
fn apply_env_overrides(config: &mut SeedConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("HISSEED_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Target overrides
    if let Ok(val) = std::env::var("HISSEED_TARGET_BASE_URL") {
        config.target.base_url = val;
    }
    if let Ok(val) = std::env::var("HISSEED_TARGET_USERNAME") {
        config.target.username = val;
    }
    if let Ok(val) = std::env::var("HISSEED_TARGET_PASSWORD") {
        config.target.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("HISSEED_TARGET_TIMEOUT_SECONDS") {
        config.target.timeout_seconds = parse_override("HISSEED_TARGET_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("HISSEED_TARGET_TLS_VERIFY") {
        config.target.tls_verify = val.parse().unwrap_or(true);
    }

    // Import overrides
    if let Ok(val) = std::env::var("HISSEED_IMPORT_FAIL_ON_JOIN_MISMATCH") {
        config.import.fail_on_join_mismatch = val.parse().unwrap_or(false);
    }

    // Identifier overrides
    if let Ok(val) = std::env::var("HISSEED_IDENTIFIERS_SEED") {
        config.identifiers.seed = parse_override("HISSEED_IDENTIFIERS_SEED", &val)?;
    }

    // Source overrides
    if let Ok(val) = std::env::var("HISSEED_SOURCES_ORG_UNITS") {
        config.sources.org_units = val;
    }
    if let Ok(val) = std::env::var("HISSEED_SOURCES_USERS") {
        config.sources.users = Some(val);
    }
    if let Ok(val) = std::env::var("HISSEED_SOURCES_DATA_DICTIONARY") {
        config.sources.data_dictionary = val;
    }

    // Metadata overrides
    if let Ok(val) = std::env::var("HISSEED_METADATA_DEFAULT_USER_PASSWORD") {
        config.metadata.default_user_password = Some(secret_string(val));
    }

    // Recompute overrides
    if let Ok(val) = std::env::var("HISSEED_RECOMPUTE_POLL_INTERVAL_MS") {
        config.recompute.poll_interval_ms =
            parse_override("HISSEED_RECOMPUTE_POLL_INTERVAL_MS", &val)?;
    }
    if let Ok(val) = std::env::var("HISSEED_RECOMPUTE_MAX_POLLS") {
        config.recompute.max_polls = parse_override("HISSEED_RECOMPUTE_MAX_POLLS", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("HISSEED_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("HISSEED_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
[target]
base_url = "https://play.example.org"
username = "admin"
password = "district"

[sources]
org_units = "data/org_units.json"
data_dictionary = "data/dictionary.csv"
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("HISSEED_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${HISSEED_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("HISSEED_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("HISSEED_LOADER_MISSING_VAR");
        let input = "password = \"${HISSEED_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("HISSEED_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${HISSEED_LOADER_COMMENTED_VAR}\"";
        assert_eq!(substitute_env_vars(input).unwrap(), format!("{input}\n"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("nonexistent.toml").unwrap_err();
        assert!(matches!(err, SeedError::Configuration(_)));
    }

    #[test]
    fn test_load_config_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.target.base_url, "https://play.example.org");
        assert_eq!(config.target.username, "admin");
        assert!(config.sources.datasets.is_empty());
    }

    #[test]
    fn test_parse_config_rejects_invalid() {
        let text = VALID.replace("https://play.example.org", "ftp://play.example.org");
        let err = parse_config(&text).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn test_parse_override_error() {
        let err = parse_override::<u64>("HISSEED_IDENTIFIERS_SEED", "abc").unwrap_err();
        assert!(err.to_string().contains("HISSEED_IDENTIFIERS_SEED"));
    }
}
