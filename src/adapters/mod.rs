//! External system integrations for hisseed.
//!
//! - [`dhis2`] - Target REST API client (metadata, data values, tasks)
//! - [`sources`] - Upstream files over HTTP(S) or from disk, and their parsers
//!
//! # Design Pattern
//!
//! Both adapters sit behind a trait ([`dhis2::MetadataApi`] and
//! [`sources::DatasetSource`]) so the orchestrator can run against in-memory
//! implementations in tests.

pub mod dhis2;
pub mod sources;
