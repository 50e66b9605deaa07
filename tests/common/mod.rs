//! Shared fixtures for the bootstrap integration tests
//!
//! [`MockApi`] is an in-memory target: it records every call, keeps the
//! organisation units it was sent so they can be read back, and accepts
//! everything unless told otherwise. [`MemorySource`] serves fixed bytes.

#![allow(dead_code)]

use async_trait::async_trait;
use hisseed::adapters::dhis2::{
    CurrentUser, ImportOptions, ImportSummary, MetadataApi, SchemaProperty, TaskStatus,
};
use hisseed::adapters::sources::DatasetSource;
use hisseed::config::{parse_config, ImportStrategy, SeedConfig};
use hisseed::core::payload::Payload;
use hisseed::domain::{Result, SeedError};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const ADMIN_ID: &str = "M5zQapPyTZI";

pub const ORG_UNITS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"code": "WLD", "name": "World"}, "geometry": null},
    {"type": "Feature", "properties": {"code": "AFR", "name": "African Region", "parent": "WLD"}, "geometry": null},
    {"type": "Feature", "properties": {"code": "SLE", "name": "Sierra Leone", "parent": "AFR"},
     "geometry": {"type": "Point", "coordinates": [-11.8, 8.5]}},
    {"type": "Feature", "properties": {"code": "GHA", "name": "Ghana", "parent": "AFR"}, "geometry": null}
  ]
}"#;

pub const DICTIONARY: &str = "variable_name,definition\n\
e_inc_num,Estimated number of incident cases\n\
e_mort_num,Estimated number of deaths\n\
c_newinc,Total of new and relapse cases\n";

pub const TB_BURDEN: &str = "country,iso3,year,e_inc_num,e_mort_num\n\
Sierra Leone,SLE,2015,10,NA\n\
Ghana,GHA,2015,44000,1200\n\
Nowhere,XXX,2015,5,6\n";

pub const USERS: &str = "firstName,surname,username,email,orgUnit\n\
Ada,Lovelace,alovelace,ada@example.org,SLE\n\
Alan,Turing,aturing,,\n";

pub const CONFIG: &str = r#"
[target]
base_url = "http://localhost:8080"
username = "admin"
password = "district"

[identifiers]
seed = 2024

[sources]
org_units = "org_units.geojson"
data_dictionary = "dictionary.csv"

[[sources.datasets]]
name = "TB burden"
location = "tb_burden.csv"
id_columns = ["iso3", "year"]
org_unit_column = "iso3"
period_column = "year"
exclude_columns = ["country"]

[metadata]
org_unit_level_names = ["World", "Region", "Country"]

[recompute]
poll_interval_ms = 0
max_polls = 10
"#;

pub fn config() -> SeedConfig {
    parse_config(CONFIG).expect("fixture config is valid")
}

pub fn source() -> MemorySource {
    MemorySource::default()
        .with("org_units.geojson", ORG_UNITS)
        .with("dictionary.csv", DICTIONARY)
        .with("tb_burden.csv", TB_BURDEN)
}

/// Serves fixed bytes by location
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn with(mut self, location: &str, contents: &str) -> Self {
        self.files
            .insert(location.to_string(), contents.as_bytes().to_vec());
        self
    }
}

#[async_trait]
impl DatasetSource for MemorySource {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| SeedError::Source(format!("no such file: {location}")))
    }
}

/// In-memory target
#[derive(Default)]
pub struct MockApi {
    /// Every call, e.g. `POST metadata organisationUnits`
    pub calls: Mutex<Vec<String>>,
    /// Every metadata payload, in order
    pub metadata: Mutex<Vec<Payload>>,
    /// Every data value payload, in order
    pub data_values: Mutex<Vec<Payload>>,
    /// Organisation units the target holds, code → id
    org_units: Mutex<Vec<(String, String)>>,
    /// Identifiers the target reports instead of the ones it was sent
    server_ids: HashMap<String, String>,
    constraints: HashMap<(String, String), SchemaProperty>,
    /// Object types the target accepts none of
    rejected: Vec<String>,
    /// Completion flags returned by successive status requests
    statuses: Mutex<VecDeque<bool>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_id(mut self, code: &str, id: &str) -> Self {
        self.server_ids.insert(code.to_string(), id.to_string());
        self
    }

    pub fn with_constraint(
        mut self,
        object_type: &str,
        property: &str,
        length: f64,
        unique: bool,
    ) -> Self {
        self.constraints.insert(
            (object_type.to_string(), property.to_string()),
            SchemaProperty {
                length: Some(length),
                unique,
                ..Default::default()
            },
        );
        self
    }

    pub fn rejecting(mut self, object_type: &str) -> Self {
        self.rejected.push(object_type.to_string());
        self
    }

    pub fn with_statuses(self, statuses: &[bool]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// The JSON metadata payload posted for `key`, if any
    pub fn posted_json(&self, key: &str) -> Option<Value> {
        self.metadata
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.as_json())
            .find(|v| v.get(key).is_some())
            .cloned()
    }

    /// The XML metadata payload containing `collection`, if any
    pub fn posted_xml(&self, collection: &str) -> Option<String> {
        let tag = format!("<{collection}>");
        self.metadata
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.as_xml())
            .find(|x| x.contains(&tag))
            .map(str::to_string)
    }

    pub fn posted_data_values(&self) -> Vec<Value> {
        self.data_values
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.as_json())
            .filter_map(|v| v["dataValues"].as_array().cloned())
            .flatten()
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn summary(&self, object_type: &str, count: usize, strategy: ImportStrategy) -> ImportSummary {
        let count = if self.rejected.iter().any(|r| r == object_type) {
            0
        } else {
            count
        };
        let (created, updated) = match strategy {
            ImportStrategy::Update => (0, count),
            _ => (count, 0),
        };
        ImportSummary {
            status: Some("OK".to_string()),
            created,
            updated,
            total: count,
            ..Default::default()
        }
    }
}

/// Object type and object count of a metadata payload
fn describe(payload: &Payload) -> (String, usize) {
    match payload {
        Payload::Json(value) => {
            let object = value.as_object().cloned().unwrap_or_default();
            let (key, items) = object.into_iter().next().unwrap_or_default();
            (key, items.as_array().map_or(0, Vec::len))
        }
        Payload::Xml(doc) => {
            let key = if doc.contains("<users>") {
                "users"
            } else {
                "userRoles"
            };
            (key.to_string(), doc.matches("lastUpdated=\"").count())
        }
    }
}

#[async_trait]
impl MetadataApi for MockApi {
    async fn me(&self) -> Result<CurrentUser> {
        self.record("GET me".to_string());
        Ok(CurrentUser {
            id: ADMIN_ID.to_string(),
            username: Some("admin".to_string()),
            display_name: Some("John Traore".to_string()),
        })
    }

    async fn import_metadata(
        &self,
        payload: &Payload,
        options: ImportOptions,
    ) -> Result<ImportSummary> {
        let (object_type, count) = describe(payload);
        self.record(format!("POST metadata {object_type}"));
        self.metadata.lock().unwrap().push(payload.clone());

        if object_type == "organisationUnits" && !self.rejected.contains(&object_type) {
            let mut held = self.org_units.lock().unwrap();
            for unit in payload.as_json().into_iter().flat_map(|v| {
                v["organisationUnits"].as_array().cloned().unwrap_or_default()
            }) {
                let code = unit["code"].as_str().unwrap_or_default().to_string();
                let id = self
                    .server_ids
                    .get(&code)
                    .cloned()
                    .unwrap_or_else(|| unit["id"].as_str().unwrap_or_default().to_string());
                held.push((code, id));
            }
        }

        Ok(self.summary(&object_type, count, options.strategy))
    }

    async fn list(&self, resource: &str, fields: &str, filter: Option<&str>) -> Result<Vec<Value>> {
        self.record(format!("GET {resource}"));
        match resource {
            "organisationUnits" => {
                assert_eq!(fields, "id,code");
                Ok(self
                    .org_units
                    .lock()
                    .unwrap()
                    .iter()
                    .map(|(code, id)| json!({"id": id, "code": code}))
                    .collect())
            }
            "users" => {
                assert_eq!(filter, Some(format!("id:eq:{ADMIN_ID}").as_str()));
                Ok(vec![json!({
                    "id": ADMIN_ID,
                    "username": "admin",
                    "firstName": "John",
                    "surname": "Traore",
                    "organisationUnits": []
                })])
            }
            other => Ok(vec![json!({"resource": other})]),
        }
    }

    async fn schema_property(&self, object_type: &str, property: &str) -> Result<SchemaProperty> {
        self.record(format!("GET schema {object_type}.{property}"));
        Ok(self
            .constraints
            .get(&(object_type.to_string(), property.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn import_data_values(&self, payload: &Payload) -> Result<ImportSummary> {
        self.record("POST dataValueSets".to_string());
        self.data_values.lock().unwrap().push(payload.clone());
        let count = payload
            .as_json()
            .and_then(|v| v["dataValues"].as_array().map(Vec::len))
            .unwrap_or(0);
        Ok(self.summary("dataValues", count, ImportStrategy::Create))
    }

    async fn trigger_analytics(&self) -> Result<()> {
        self.record("POST resourceTables/analytics".to_string());
        Ok(())
    }

    async fn task_status(&self, task_type: &str) -> Result<TaskStatus> {
        self.record(format!("GET tasks {task_type}"));
        let completed = self.statuses.lock().unwrap().pop_front().unwrap_or(true);
        Ok(TaskStatus {
            completed,
            message: None,
        })
    }
}
