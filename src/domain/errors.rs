//! Domain error types
//!
//! This module defines the error hierarchy for hisseed. Errors are domain-specific
//! and don't expose third-party types: HTTP client, CSV and XML failures are
//! converted to strings at the adapter boundary.

use thiserror::Error;

/// Main hisseed error type
///
/// This is the primary error type used throughout the application. Every remote
/// failure is fatal to a bootstrap run; the orchestrator wraps the failing
/// stage's error in [`SeedError::StageFailed`].
#[derive(Debug, Error)]
pub enum SeedError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The authentication check did not succeed
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The target rejected an import, or accepted fewer objects than were sent
    #[error("Import of {object_type} rejected: {accepted}/{expected} accepted ({message})")]
    ImportRejected {
        object_type: String,
        expected: usize,
        accepted: usize,
        message: String,
    },

    /// Local pre-flight validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Rows were dropped by an inner join and strict mode is enabled
    #[error("Join mismatch in {context}: {dropped} of {left_rows} rows had no match")]
    JoinMismatch {
        context: String,
        dropped: usize,
        left_rows: usize,
    },

    /// Target API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Upstream source file could not be fetched or parsed
    #[error("Source error: {0}")]
    Source(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// A bounded wait ran out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Error carrying caller-supplied context
    #[error("{0}")]
    Other(String),

    /// A bootstrap stage failed and the run was halted
    #[error("Stage {stage} failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: Box<SeedError>,
    },
}

impl SeedError {
    /// Returns the innermost error, unwrapping any [`SeedError::StageFailed`] layers
    pub fn root_cause(&self) -> &SeedError {
        match self {
            SeedError::StageFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Name of the stage that failed, if the error came out of the orchestrator
    pub fn failed_stage(&self) -> Option<&str> {
        match self {
            SeedError::StageFailed { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

/// Target API errors
///
/// Errors that occur when talking to the target system's REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to reach the server
    #[error("Failed to connect to target: {0}")]
    ConnectionFailed(String),

    /// Invalid or unexpected response body
    #[error("Invalid response from target: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl ApiError {
    /// Classifies a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 {
            ApiError::ServerError { status, message }
        } else {
            ApiError::ClientError { status, message }
        }
    }
}

/// Local validation failures raised before anything is sent to the target
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two or more records share a unique key after truncation
    #[error("duplicate {field} '{value}' shared by {count} records (max length {max_length})")]
    DuplicateKey {
        field: String,
        value: String,
        count: usize,
        max_length: usize,
    },

    /// A required field is empty
    #[error("required field {field} is empty in record {index}")]
    MissingRequiredField { field: String, index: usize },

    /// A column named in configuration is absent from a table
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// An externally supplied identifier is malformed
    #[error("invalid identifier: {0}")]
    InvalidUid(String),

    /// The organisation unit hierarchy is inconsistent
    #[error("organisation unit hierarchy: {0}")]
    Hierarchy(String),

    /// A key field is longer than the target allows and cannot be truncated
    #[error("{field} '{value}' exceeds the maximum length of {max_length}")]
    TooLong {
        field: String,
        value: String,
        max_length: usize,
    },
}

impl From<std::io::Error> for SeedError {
    fn from(err: std::io::Error) -> Self {
        SeedError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SeedError {
    fn from(err: serde_json::Error) -> Self {
        SeedError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SeedError {
    fn from(err: toml::de::Error) -> Self {
        SeedError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for SeedError {
    fn from(err: csv::Error) -> Self {
        SeedError::Source(format!("CSV error: {err}"))
    }
}
