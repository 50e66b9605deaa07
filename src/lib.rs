// Hisseed - Deterministic DHIS2 metadata and data bootstrapper
// Copyright (c) 2025 Hisseed Contributors
// Licensed under the MIT License

//! # Hisseed - Deterministic metadata and data bootstrapper
//!
//! Hisseed populates an empty DHIS2-style health information system with a
//! complete, internally consistent set of metadata and observations taken
//! from public sources: an organisation unit hierarchy, users and their role,
//! data elements built from a data dictionary, and the data values of wide
//! CSV datasets.
//!
//! ## Overview
//!
//! A run is a fixed sequence of stages. Each one builds a payload, posts it to
//! the target's REST API and checks that every object was accepted:
//!
//! - **Identifiers** come from a seeded generator, so the same seed and input
//!   give the same identifiers on every run
//! - **Names** are truncated to the lengths the target's schema reports, and
//!   collisions introduced by truncation are caught before anything is sent
//! - **Datasets** are reshaped from wide to long and joined against the
//!   identifiers the target reports back
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Identifier generation, normalization, reshaping, joins,
//!   payloads and the bootstrap orchestrator
//! - [`adapters`] - Target REST API client and upstream file sources
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hisseed::adapters::dhis2::Dhis2Client;
//! use hisseed::adapters::sources::SourceFetcher;
//! use hisseed::config::load_config;
//! use hisseed::core::bootstrap::Bootstrapper;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("hisseed.toml")?;
//!     let api = Dhis2Client::new(&config.target)?;
//!     let source = SourceFetcher::new(Duration::from_secs(60))?;
//!
//!     let summary = Bootstrapper::new(config, api, source).run().await?;
//!     println!("Imported {} data values", summary.imported_count("dataValues"));
//!     Ok(())
//! }
//! ```
//!
//! ## Reproducible identifiers
//!
//! ```rust
//! use hisseed::core::uid::generate_uids;
//!
//! assert_eq!(generate_uids(3, 42), generate_uids(3, 42));
//! assert_ne!(generate_uids(3, 42), generate_uids(3, 43));
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`]. A failed run reports
//! the stage that halted it:
//!
//! ```rust
//! use hisseed::domain::SeedError;
//!
//! let err = SeedError::StageFailed {
//!     stage: "ImportDataElements".to_string(),
//!     source: Box::new(SeedError::Timeout("schema lookup".to_string())),
//! };
//! assert_eq!(err.failed_stage(), Some("ImportDataElements"));
//! assert!(matches!(err.root_cause(), SeedError::Timeout(_)));
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
