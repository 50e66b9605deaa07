//! Bootstrap summary and reporting

use super::stage::BootstrapStage;
use crate::core::join::JoinReport;
use std::collections::BTreeMap;
use std::time::Duration;

/// Join counts for one dataset and key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetJoin {
    /// Dataset name
    pub dataset: String,

    /// What was joined, e.g. `orgUnit` or `dataElement`
    pub key: String,

    pub report: JoinReport,
}

/// Summary of a bootstrap run
#[derive(Debug, Clone, Default)]
pub struct BootstrapSummary {
    /// Stages that finished, in order
    pub stages_completed: Vec<BootstrapStage>,

    /// Objects accepted by the target, per object type
    pub imported: BTreeMap<String, usize>,

    /// Join counts of the reshape stage
    pub joins: Vec<DatasetJoin>,

    /// SHA-256 of every payload sent, per object type
    ///
    /// XML payloads carry a timestamp, so `userRoles` and `users` only match
    /// across runs when `metadata.timestamp` is set.
    pub checksums: BTreeMap<String, String>,

    /// Task status requests made while waiting for the recompute
    pub polls: usize,

    /// Duration of the run
    pub duration: Duration,
}

impl BootstrapSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn record_stage(&mut self, stage: BootstrapStage) {
        self.stages_completed.push(stage);
    }

    pub fn record_import(&mut self, object_type: &str, accepted: usize, checksum: String) {
        *self.imported.entry(object_type.to_string()).or_default() += accepted;
        self.checksums.insert(object_type.to_string(), checksum);
    }

    pub fn record_join(&mut self, dataset: &str, key: &str, report: JoinReport) {
        self.joins.push(DatasetJoin {
            dataset: dataset.to_string(),
            key: key.to_string(),
            report,
        });
    }

    /// Objects accepted for one type, zero if none were sent
    pub fn imported_count(&self, object_type: &str) -> usize {
        self.imported.get(object_type).copied().unwrap_or(0)
    }

    /// Rows dropped across every join
    pub fn dropped_rows(&self) -> usize {
        self.joins.iter().map(|j| j.report.dropped()).sum()
    }

    /// Whether every stage ran
    pub fn is_complete(&self) -> bool {
        self.stages_completed.last() == Some(&BootstrapStage::Done)
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            stages = self.stages_completed.len(),
            org_units = self.imported_count("organisationUnits"),
            users = self.imported_count("users"),
            data_elements = self.imported_count("dataElements"),
            data_values = self.imported_count("dataValues"),
            dropped_rows = self.dropped_rows(),
            polls = self.polls,
            duration_secs = self.duration.as_secs(),
            "Bootstrap completed"
        );

        for join in self.joins.iter().filter(|j| j.report.dropped() > 0) {
            tracing::warn!(
                dataset = %join.dataset,
                key = %join.key,
                dropped = join.report.dropped(),
                left_rows = join.report.left_rows,
                "Rows dropped by join"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_import_accumulates() {
        let mut summary = BootstrapSummary::new();
        summary.record_import("dataValues", 10, "a".into());
        summary.record_import("dataValues", 5, "b".into());

        assert_eq!(summary.imported_count("dataValues"), 15);
        assert_eq!(summary.checksums["dataValues"], "b");
        assert_eq!(summary.imported_count("users"), 0);
    }

    #[test]
    fn test_dropped_rows() {
        let mut summary = BootstrapSummary::new();
        summary.record_join(
            "TB burden",
            "orgUnit",
            JoinReport {
                left_rows: 10,
                right_rows: 3,
                matched_left_rows: 7,
                output_rows: 7,
            },
        );
        assert_eq!(summary.dropped_rows(), 3);
    }

    #[test]
    fn test_is_complete() {
        let mut summary = BootstrapSummary::new();
        summary.record_stage(BootstrapStage::Authenticate);
        assert!(!summary.is_complete());
        summary.record_stage(BootstrapStage::Done);
        assert!(summary.is_complete());
    }
}
