//! Metadata and data payload builders
//!
//! Every builder here is a pure transformation from domain records into the
//! wire format the target's import endpoints accept. Nothing in this module
//! performs I/O; the result is handed unchanged to the API adapter.
//!
//! - [`metadata`] - JSON metadata bundles (org units, levels, data elements, groups)
//! - [`xml`] - DXF2 XML documents (user roles, users)
//! - [`data_values`] - bulk data value sets

pub mod data_values;
pub mod metadata;
pub mod xml;

pub use data_values::data_value_set;
pub use metadata::{
    data_element_groups, data_elements, org_unit_levels, org_units, user_home_org_units,
};
pub use xml::{user_roles_xml, users_xml};

use crate::domain::{Result, SeedError};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// A serialized, self-contained import payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Xml(String),
}

impl Payload {
    /// MIME type to send the payload with
    pub fn content_type(&self) -> &'static str {
        match self {
            Payload::Json(_) => "application/json",
            Payload::Xml(_) => "application/xml",
        }
    }

    /// Request body bytes
    pub fn to_body(&self) -> Result<Vec<u8>> {
        match self {
            Payload::Json(value) => Ok(serde_json::to_vec(value)?),
            Payload::Xml(doc) => Ok(doc.as_bytes().to_vec()),
        }
    }

    /// SHA-256 of the payload, hex-encoded
    ///
    /// JSON is hashed in canonical form (sorted keys), so two runs with the
    /// same seed and inputs produce the same checksum.
    pub fn checksum(&self) -> Result<String> {
        let bytes = match self {
            Payload::Json(value) => serde_json::to_vec(&canonical(value))
                .map_err(|e| SeedError::Serialization(e.to_string()))?,
            Payload::Xml(doc) => doc.as_bytes().to_vec(),
        };

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// The JSON value, if this is a JSON payload
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Xml(_) => None,
        }
    }

    /// The XML document, if this is an XML payload
    pub fn as_xml(&self) -> Option<&str> {
        match self {
            Payload::Json(_) => None,
            Payload::Xml(doc) => Some(doc),
        }
    }
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonical(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_ignores_key_order() {
        let a = Payload::Json(json!({"a": 1, "b": {"c": 2, "d": 3}}));
        let b = Payload::Json(json!({"b": {"d": 3, "c": 2}, "a": 1}));
        assert_eq!(a.checksum().unwrap(), b.checksum().unwrap());
        assert_eq!(a.checksum().unwrap().len(), 64);
    }

    #[test]
    fn test_checksum_differs_on_content() {
        let a = Payload::Json(json!({"a": 1}));
        let b = Payload::Json(json!({"a": 2}));
        assert_ne!(a.checksum().unwrap(), b.checksum().unwrap());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(Payload::Json(json!({})).content_type(), "application/json");
        assert_eq!(
            Payload::Xml("<metadata/>".to_string()).content_type(),
            "application/xml"
        );
    }

    #[test]
    fn test_to_body() {
        let body = Payload::Xml("<metadata/>".to_string()).to_body().unwrap();
        assert_eq!(body, b"<metadata/>");
    }
}
