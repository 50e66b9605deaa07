//! Core business logic for hisseed.
//!
//! This module contains the pure transformations of a bootstrap run and the
//! orchestrator that sequences them against the target.
//!
//! # Modules
//!
//! - [`uid`] - Deterministic identifier generation
//! - [`normalize`] - Truncation and duplicate detection against schema limits
//! - [`reshape`] - Wide-to-long reshaping of datasets
//! - [`join`] - Inner joins with row-count reports
//! - [`payload`] - Metadata and data value payload builders
//! - [`bootstrap`] - Stage sequencing and run summary
//!
//! # Bootstrap Workflow
//!
//! 1. **Authenticate**: Check the target with the configured credentials
//! 2. **Organisation units**: Import the hierarchy, read it back, set levels
//! 3. **Users**: Assign the admin's home units, import the role and the roster
//! 4. **Data elements**: Import dictionary entries used by a dataset, grouped per dataset
//! 5. **Data values**: Reshape and join the datasets, import the values
//! 6. **Recompute**: Trigger analytics and wait for the task to complete
//!
//! # Example
//!
//! ```rust,no_run
//! use hisseed::adapters::dhis2::Dhis2Client;
//! use hisseed::adapters::sources::SourceFetcher;
//! use hisseed::config::load_config;
//! use hisseed::core::bootstrap::Bootstrapper;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hisseed.toml")?;
//! let api = Dhis2Client::new(&config.target)?;
//! let source = SourceFetcher::new(Duration::from_secs(config.target.timeout_seconds))?;
//!
//! let summary = Bootstrapper::new(config, api, source).run().await?;
//! println!("Data values: {}", summary.imported_count("dataValues"));
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod join;
pub mod normalize;
pub mod payload;
pub mod reshape;
pub mod uid;
