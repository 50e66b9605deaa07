//! JSON metadata bundles for `POST /api/metadata`

use super::Payload;
use crate::domain::{
    DataElement, DataElementGroup, OrgUnit, OrgUnitLevel, Result, SeedError, Uid,
};
use serde::Serialize;
use serde_json::{json, Value};

/// Reference to another object by identifier
#[derive(Debug, Clone, Serialize)]
struct Ref<'a> {
    id: &'a str,
}

impl<'a> From<&'a Uid> for Ref<'a> {
    fn from(uid: &'a Uid) -> Self {
        Ref { id: uid.as_str() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrgUnitJson<'a> {
    id: &'a str,
    code: &'a str,
    name: &'a str,
    short_name: &'a str,
    opening_date: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<Ref<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataElementGroupJson<'a> {
    id: &'a str,
    code: &'a str,
    name: &'a str,
    short_name: &'a str,
    data_elements: Vec<Ref<'a>>,
}

fn bundle<T: Serialize>(key: &str, objects: &[T]) -> Result<Payload> {
    let objects = serde_json::to_value(objects)?;
    Ok(Payload::Json(json!({ key: objects })))
}

/// `{"organisationUnits": [...]}` with parents referenced by id
pub fn org_units(units: &[OrgUnit], opening_date: &str) -> Result<Payload> {
    let objects: Vec<OrgUnitJson<'_>> = units
        .iter()
        .map(|u| OrgUnitJson {
            id: u.id.as_str(),
            code: &u.code,
            name: &u.name,
            short_name: &u.short_name,
            opening_date,
            parent: u.parent.as_ref().map(Ref::from),
            geometry: u.geometry.as_ref(),
        })
        .collect();

    bundle("organisationUnits", &objects)
}

/// `{"organisationUnitLevels": [...]}`
pub fn org_unit_levels(levels: &[OrgUnitLevel]) -> Result<Payload> {
    let objects: Vec<Value> = levels
        .iter()
        .map(|l| json!({ "id": l.id, "name": l.name, "level": l.level }))
        .collect();

    bundle("organisationUnitLevels", &objects)
}

/// `{"dataElements": [...]}`
pub fn data_elements(elements: &[DataElement]) -> Result<Payload> {
    bundle("dataElements", elements)
}

/// `{"dataElementGroups": [...]}` with member ids nested under each group
pub fn data_element_groups(groups: &[DataElementGroup]) -> Result<Payload> {
    let objects: Vec<DataElementGroupJson<'_>> = groups
        .iter()
        .map(|g| DataElementGroupJson {
            id: g.id.as_str(),
            code: &g.code,
            name: &g.name,
            short_name: &g.short_name,
            data_elements: g.members.iter().map(Ref::from).collect(),
        })
        .collect();

    bundle("dataElementGroups", &objects)
}

/// Update bundle assigning capture and view org units to an existing user
///
/// `user` is the user object as read back from the target; all of its other
/// properties are kept so that an `UPDATE` import does not clear them.
pub fn user_home_org_units(user: &Value, org_units: &[Uid]) -> Result<Payload> {
    let mut user = user.clone();
    let object = user.as_object_mut().ok_or_else(|| {
        SeedError::Serialization("user read-back is not a JSON object".to_string())
    })?;

    let refs = serde_json::to_value(org_units.iter().map(Ref::from).collect::<Vec<_>>())?;
    object.insert("organisationUnits".to_string(), refs.clone());
    object.insert("dataViewOrganisationUnits".to_string(), refs);

    Ok(Payload::Json(json!({ "users": [user] })))
}
