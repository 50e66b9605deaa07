//! Target instance adapter
//!
//! This module provides the REST client for the health information system
//! being seeded, the trait the orchestrator depends on, and the API models.

pub mod client;
pub mod models;

pub use client::{Dhis2Client, MetadataApi};
pub use models::{CurrentUser, ImportOptions, ImportSummary, SchemaProperty, TaskStatus};
