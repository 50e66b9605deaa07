//! Request and response models of the target REST API

use crate::config::{AtomicMode, ImportStrategy};
use crate::core::normalize::SchemaConstraint;
use crate::domain::{ApiError, Result, SeedError};
use serde::Deserialize;
use serde_json::Value;

/// Query parameters of a metadata import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOptions {
    pub strategy: ImportStrategy,
    pub atomic_mode: AtomicMode,
}

impl ImportOptions {
    pub fn new(strategy: ImportStrategy, atomic_mode: AtomicMode) -> Self {
        Self {
            strategy,
            atomic_mode,
        }
    }

    /// Same atomic mode, `UPDATE` strategy
    pub fn update(self) -> Self {
        Self {
            strategy: ImportStrategy::Update,
            ..self
        }
    }

    /// Whether updated objects count as accepted
    pub fn counts_updates(&self) -> bool {
        !matches!(self.strategy, ImportStrategy::Create)
    }
}

/// Authenticated user as returned by `GET /api/me`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Stats {
    #[serde(default)]
    created: usize,
    #[serde(default)]
    updated: usize,
    #[serde(default)]
    deleted: usize,
    #[serde(default)]
    ignored: usize,
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Default, Deserialize)]
struct ImportCount {
    #[serde(default)]
    imported: usize,
    #[serde(default)]
    updated: usize,
    #[serde(default)]
    ignored: usize,
    #[serde(default)]
    deleted: usize,
}

/// Counts reported by an import endpoint
///
/// Metadata imports report `stats`, data value imports report `importCount`;
/// either may sit at the top level or under `response`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub status: Option<String>,
    pub created: usize,
    pub updated: usize,
    pub ignored: usize,
    pub deleted: usize,
    pub total: usize,
    /// Error reports and conflicts, in response order
    pub messages: Vec<String>,
}

impl ImportSummary {
    /// Parses an import response body
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidResponse`] if neither `stats` nor
    /// `importCount` is present
    pub fn from_response(body: &Value) -> Result<Self> {
        let report = match body.get("response") {
            Some(inner) if inner.is_object() => inner,
            _ => body,
        };

        let status = report
            .get("status")
            .or_else(|| body.get("status"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut summary = if let Some(stats) = report.get("stats") {
            let stats: Stats = serde_json::from_value(stats.clone())?;
            ImportSummary {
                status,
                created: stats.created,
                updated: stats.updated,
                ignored: stats.ignored,
                deleted: stats.deleted,
                total: stats.total,
                messages: Vec::new(),
            }
        } else if let Some(count) = report.get("importCount") {
            let count: ImportCount = serde_json::from_value(count.clone())?;
            ImportSummary {
                status,
                created: count.imported,
                updated: count.updated,
                ignored: count.ignored,
                deleted: count.deleted,
                total: count.imported + count.updated + count.ignored + count.deleted,
                messages: Vec::new(),
            }
        } else {
            return Err(ApiError::InvalidResponse(
                "import response has neither stats nor importCount".to_string(),
            )
            .into());
        };

        summary.messages = collect_messages(report);
        Ok(summary)
    }

    /// Objects the server accepted
    pub fn accepted(&self, counts_updates: bool) -> usize {
        if counts_updates {
            self.created + self.updated
        } else {
            self.created
        }
    }

    /// Fails unless exactly `expected` objects were accepted
    pub fn ensure_accepted(
        &self,
        object_type: &str,
        expected: usize,
        counts_updates: bool,
    ) -> Result<()> {
        let accepted = self.accepted(counts_updates);
        if accepted == expected {
            return Ok(());
        }

        let message = if self.messages.is_empty() {
            format!(
                "status {}, {} ignored",
                self.status.as_deref().unwrap_or("unknown"),
                self.ignored
            )
        } else {
            self.messages.join("; ")
        };

        Err(SeedError::ImportRejected {
            object_type: object_type.to_string(),
            expected,
            accepted,
            message,
        })
    }
}

fn collect_messages(report: &Value) -> Vec<String> {
    let mut messages = Vec::new();

    if let Some(conflicts) = report.get("conflicts").and_then(Value::as_array) {
        for conflict in conflicts {
            let object = conflict.get("object").and_then(Value::as_str).unwrap_or("");
            let value = conflict.get("value").and_then(Value::as_str).unwrap_or("");
            messages.push(format!("{object}: {value}").trim_start_matches(": ").to_string());
        }
    }

    let type_reports = report
        .get("typeReports")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();
    for type_report in type_reports {
        let object_reports = type_report
            .get("objectReports")
            .and_then(Value::as_array)
            .into_iter()
            .flatten();
        for object_report in object_reports {
            let error_reports = object_report
                .get("errorReports")
                .and_then(Value::as_array)
                .into_iter()
                .flatten();
            for error in error_reports {
                if let Some(message) = error.get("message").and_then(Value::as_str) {
                    messages.push(message.to_string());
                }
            }
        }
    }

    messages
}

/// One property of `GET /api/schemas/<type>/<property>`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaProperty {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub field_name: Option<String>,

    #[serde(default)]
    pub length: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub property_type: Option<String>,
}

impl SchemaProperty {
    /// Converts to a normalizer constraint
    ///
    /// `length` wins over `max`; with neither the field is unbounded.
    pub fn into_constraint(self, property: &str) -> SchemaConstraint {
        let max_length = self
            .length
            .or(self.max)
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n as usize)
            .unwrap_or(usize::MAX);

        SchemaConstraint {
            name: self
                .field_name
                .or(self.name)
                .unwrap_or_else(|| property.to_string()),
            max_length,
            required: self.required,
            unique: self.unique,
            property_type: self.property_type,
        }
    }
}

/// State of a background task
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskStatus {
    pub completed: bool,
    pub message: Option<String>,
}

impl TaskStatus {
    /// Parses `GET /api/system/tasks/<taskType>`
    ///
    /// The latest notification is the first element of an array. The body may
    /// also be a single notification, or an object keyed by job id whose
    /// values are notification arrays. An empty body means nothing has
    /// reported yet.
    pub fn from_response(body: &Value) -> Self {
        let latest = match body {
            Value::Array(items) => items.first(),
            Value::Object(map) if map.contains_key("completed") => Some(body),
            Value::Object(map) => map
                .values()
                .filter_map(Value::as_array)
                .find_map(|items| items.first()),
            _ => None,
        };

        match latest {
            Some(notification) => TaskStatus {
                completed: notification
                    .get("completed")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                message: notification
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            None => TaskStatus::default(),
        }
    }
}
