//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with a configurable level
//! - JSON-formatted local log files with rotation
//! - Macros for the events every bootstrap run emits
//!
//! # Example
//!
//! ```no_run
//! use hisseed::logging::init_logging;
//! use hisseed::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard, LOG_FILE_PREFIX};

/// Log the start of a bootstrap stage
///
/// # Example
///
/// ```no_run
/// use hisseed::log_stage_start;
/// use hisseed::core::bootstrap::BootstrapStage;
///
/// log_stage_start!(BootstrapStage::ImportOrgUnits);
/// ```
#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr) => {
        tracing::info!(stage = %$stage, "Starting stage");
    };
}

/// Log the completion of a bootstrap stage
///
/// # Example
///
/// ```no_run
/// use hisseed::log_stage_complete;
/// use hisseed::core::bootstrap::BootstrapStage;
/// use std::time::Duration;
///
/// log_stage_complete!(BootstrapStage::ImportOrgUnits, Duration::from_millis(850));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $duration:expr) => {
        tracing::info!(
            stage = %$stage,
            duration_ms = $duration.as_millis() as u64,
            "Stage completed"
        );
    };
}

/// Log an import the target accepted
///
/// # Example
///
/// ```no_run
/// use hisseed::log_import_result;
///
/// log_import_result!("dataElements", 42, 42);
/// ```
#[macro_export]
macro_rules! log_import_result {
    ($object_type:expr, $expected:expr, $accepted:expr) => {
        tracing::info!(
            object_type = $object_type,
            expected = $expected,
            accepted = $accepted,
            "Import accepted"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use hisseed::log_error_with_context;
/// use hisseed::domain::SeedError;
///
/// let error = SeedError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a status request that found the task still running
///
/// # Example
///
/// ```no_run
/// use hisseed::log_poll_attempt;
///
/// log_poll_attempt!(2, 360, "Populating analytics tables");
/// ```
#[macro_export]
macro_rules! log_poll_attempt {
    ($attempt:expr, $max_polls:expr, $message:expr) => {
        tracing::debug!(
            attempt = $attempt,
            max_polls = $max_polls,
            message = $message,
            "Task still running"
        );
    };
}
