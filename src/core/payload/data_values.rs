//! Bulk data value sets for `POST /api/dataValueSets`

use super::Payload;
use crate::domain::{DataValueRecord, Result};
use serde_json::json;

/// `{"dataValues": [...]}`, one entry per record in input order
pub fn data_value_set(records: &[DataValueRecord]) -> Result<Payload> {
    let values = serde_json::to_value(records)?;
    Ok(Payload::Json(json!({ "dataValues": values })))
}
