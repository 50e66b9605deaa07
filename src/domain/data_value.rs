//! Observational data value model

use super::ids::Uid;
use serde::{Deserialize, Serialize};

/// The atomic unit of observational data sent to the target
///
/// The value is carried as text regardless of its numeric origin; the target
/// parses it according to the data element's value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValueRecord {
    pub data_element: Uid,
    pub period: String,
    pub org_unit: Uid,
    pub value: String,
}

impl DataValueRecord {
    pub fn new(
        data_element: Uid,
        period: impl Into<String>,
        org_unit: Uid,
        value: impl Into<String>,
    ) -> Self {
        Self {
            data_element,
            period: period.into(),
            org_unit,
            value: value.into(),
        }
    }
}
