//! Integration tests for logging functionality

use hisseed::config::LoggingConfig;
use hisseed::logging::{init_logging, parse_log_level, LOG_FILE_PREFIX};
use tempfile::TempDir;
use tracing::Level;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_parse_log_level_is_case_insensitive() {
    assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn test_invalid_level_fails_before_touching_the_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("never-created");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "daily".to_string(),
    };

    assert!(init_logging("verbose", &config).is_err());
    assert!(!log_path.exists());
}

// Only one test per process may install the global subscriber
#[test]
fn test_file_logging_creates_directory_and_writes_json() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("info", &config).unwrap();
    assert!(guard.has_file_writer());
    assert!(log_path.is_dir());

    tracing::info!(target: "hisseed", stage = "Authenticate", "Stage started");
    drop(guard);

    let contents = std::fs::read_to_string(log_path.join(LOG_FILE_PREFIX)).unwrap();
    let line = contents.lines().next().unwrap();
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["fields"]["stage"], "Authenticate");

    // A second subscriber cannot be installed
    let second = LoggingConfig::default();
    assert!(init_logging("info", &second).is_err());
}
