//! Upstream file adapter
//!
//! [`DatasetSource`] fetches raw bytes; the [`parse`] functions turn them into
//! domain records. Keeping the two apart lets the orchestrator run against
//! in-memory sources in tests.

pub mod fetch;
pub mod parse;

pub use fetch::{is_remote, DatasetSource, SourceFetcher};
pub use parse::{parse_dictionary, parse_org_units, parse_table, parse_users};
