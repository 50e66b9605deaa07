//! Error context extension trait
//!
//! A small counterpart of `anyhow::Context` for `Result<T, SeedError>`, so
//! library code can say which file, dataset or object failed without leaving
//! the domain error type.
//!
//! # Examples
//!
//! ```rust
//! use hisseed::domain::Result;
//! use hisseed::domain::context::ResultExt;
//!
//! fn read_roster(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read user roster {path}"))
//! }
//! ```

use crate::domain::errors::SeedError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error, evaluated eagerly
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error, computed only if an error occurs
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SeedError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| SeedError::Other(format!("{context}: {}", e.into())))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let base_error = e.into();
            SeedError::Other(format!("{}: {base_error}", f()))
        })
    }
}
