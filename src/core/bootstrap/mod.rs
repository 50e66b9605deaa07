//! Bootstrap orchestration
//!
//! This module drives a run end to end:
//!
//! - [`stage`] - The fixed stage sequence
//! - [`orchestrator`] - [`Bootstrapper`], which executes the stages
//! - [`summary`] - Counts, join reports and checksums of a run

pub mod orchestrator;
pub mod stage;
pub mod summary;

pub use orchestrator::Bootstrapper;
pub use stage::BootstrapStage;
pub use summary::{BootstrapSummary, DatasetJoin};
