//! Data element domain models
//!
//! Data elements are built from a data dictionary: one entry per variable that
//! appears in an external dataset. Groups collect the elements of one dataset.

use super::ids::Uid;
use serde::{Deserialize, Serialize};

/// Value type assigned to imported data elements
pub const DEFAULT_VALUE_TYPE: &str = "NUMBER";

/// Aggregation type assigned to imported data elements
pub const DEFAULT_AGGREGATION_TYPE: &str = "SUM";

/// One data dictionary row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// Variable name, used as the data element code
    pub code: String,
    /// Human-readable definition, used as the data element name
    pub definition: String,
    /// Dataset the variable belongs to, if the dictionary says
    pub dataset: Option<String>,
}

/// Data element ready for import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataElement {
    pub id: Uid,
    pub code: String,
    pub name: String,
    pub short_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value_type: String,
    pub aggregation_type: String,
    pub domain_type: String,
}

impl DataElement {
    /// Creates a new builder for constructing a DataElement
    pub fn builder() -> DataElementBuilder {
        DataElementBuilder::default()
    }
}

/// Builder for constructing DataElement instances
#[derive(Debug, Default)]
pub struct DataElementBuilder {
    id: Option<Uid>,
    code: Option<String>,
    name: Option<String>,
    short_name: Option<String>,
    description: Option<String>,
    value_type: Option<String>,
    aggregation_type: Option<String>,
}

impl DataElementBuilder {
    /// Creates a new builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: Uid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    pub fn aggregation_type(mut self, aggregation_type: impl Into<String>) -> Self {
        self.aggregation_type = Some(aggregation_type.into());
        self
    }

    /// Builds the DataElement
    ///
    /// Name and short name fall back to the code.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or code is missing
    pub fn build(self) -> Result<DataElement, String> {
        let id = self.id.ok_or("Data element id is required")?;
        let code = self.code.ok_or("Data element code is required")?;
        let name = self.name.unwrap_or_else(|| code.clone());
        let short_name = self.short_name.unwrap_or_else(|| code.clone());

        Ok(DataElement {
            id,
            code,
            name,
            short_name,
            description: self.description.filter(|d| !d.is_empty()),
            value_type: self
                .value_type
                .unwrap_or_else(|| DEFAULT_VALUE_TYPE.to_string()),
            aggregation_type: self
                .aggregation_type
                .unwrap_or_else(|| DEFAULT_AGGREGATION_TYPE.to_string()),
            domain_type: "AGGREGATE".to_string(),
        })
    }
}

/// Data element group with its member identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataElementGroup {
    pub id: Uid,
    pub code: String,
    pub name: String,
    pub short_name: String,
    pub members: Vec<Uid>,
}
