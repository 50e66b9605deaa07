//! Organisation unit domain model
//!
//! Organisation units arrive from a boundary source as flat records that name
//! their parent by code. [`build_hierarchy`] resolves those codes into
//! identifiers, assigns levels and orders the units parents-first so that a
//! single import never references a parent it has not yet sent.

use super::errors::ValidationError;
use super::ids::Uid;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Organisation unit as read from the boundary source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgUnitSource {
    /// Identifier supplied by the source, if any
    #[serde(default)]
    pub id: Option<String>,

    /// Unique code, usually an ISO 3166 alpha-3 country code
    pub code: String,

    /// Display name (defaults to the code when absent)
    #[serde(default)]
    pub name: String,

    /// Short display name (defaults to the name when absent)
    #[serde(default, rename = "shortName", alias = "short_name")]
    pub short_name: String,

    /// Code of the parent unit; `None` for roots
    #[serde(default)]
    pub parent: Option<String>,

    /// Boundary geometry passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<serde_json::Value>,
}

impl OrgUnitSource {
    /// Creates a source record with name and short name equal to the code
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            id: None,
            name: code.clone(),
            short_name: code.clone(),
            code,
            parent: None,
            geometry: None,
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the parent code
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets a source-supplied identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Fills blank name and short name from the code and name respectively
    pub fn fill_defaults(&mut self) {
        self.code = self.code.trim().to_string();
        if self.name.trim().is_empty() {
            self.name = self.code.clone();
        }
        if self.short_name.trim().is_empty() {
            self.short_name = self.name.clone();
        }
        if let Some(parent) = &self.parent {
            if parent.trim().is_empty() {
                self.parent = None;
            }
        }
    }
}

/// Organisation unit ready for import
#[derive(Debug, Clone, PartialEq)]
pub struct OrgUnit {
    pub id: Uid,
    pub code: String,
    pub name: String,
    pub short_name: String,
    pub parent: Option<Uid>,
    /// Depth in the hierarchy, roots are level 1
    pub level: usize,
    pub geometry: Option<serde_json::Value>,
}

/// Named hierarchy level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgUnitLevel {
    pub id: Uid,
    pub name: String,
    pub level: usize,
}

/// Resolves parent codes, assigns levels and orders units parents-first
///
/// `ids` must be parallel to `sources`. Within a level the source order is
/// kept, so the output is deterministic for a given input.
///
/// # Errors
///
/// Returns [`ValidationError::Hierarchy`] for duplicate codes, unknown parents
/// and units that cannot be reached from a root (cycles).
pub fn build_hierarchy(
    sources: Vec<OrgUnitSource>,
    ids: Vec<Uid>,
) -> Result<Vec<OrgUnit>, ValidationError> {
    if sources.len() != ids.len() {
        return Err(ValidationError::Hierarchy(format!(
            "{} units but {} identifiers",
            sources.len(),
            ids.len()
        )));
    }

    let mut id_by_code: HashMap<&str, &Uid> = HashMap::with_capacity(sources.len());
    for (source, id) in sources.iter().zip(&ids) {
        if id_by_code.insert(source.code.as_str(), id).is_some() {
            return Err(ValidationError::Hierarchy(format!(
                "duplicate code '{}'",
                source.code
            )));
        }
    }

    for source in &sources {
        if let Some(parent) = &source.parent {
            if !id_by_code.contains_key(parent.as_str()) {
                return Err(ValidationError::Hierarchy(format!(
                    "unit '{}' references unknown parent '{}'",
                    source.code, parent
                )));
            }
        }
    }

    let mut levels: HashMap<String, usize> = HashMap::with_capacity(sources.len());
    let mut ordered: Vec<usize> = Vec::with_capacity(sources.len());
    let mut frontier: HashSet<String> = HashSet::new();

    for (idx, source) in sources.iter().enumerate() {
        if source.parent.is_none() {
            levels.insert(source.code.clone(), 1);
            frontier.insert(source.code.clone());
            ordered.push(idx);
        }
    }

    if ordered.is_empty() && !sources.is_empty() {
        return Err(ValidationError::Hierarchy(
            "no root unit (every unit has a parent)".to_string(),
        ));
    }

    let mut level = 1;
    while !frontier.is_empty() {
        level += 1;
        let mut next = HashSet::new();
        for (idx, source) in sources.iter().enumerate() {
            let Some(parent) = &source.parent else {
                continue;
            };
            if frontier.contains(parent) && !levels.contains_key(&source.code) {
                levels.insert(source.code.clone(), level);
                next.insert(source.code.clone());
                ordered.push(idx);
            }
        }
        frontier = next;
    }

    if ordered.len() != sources.len() {
        let unreachable: Vec<&str> = sources
            .iter()
            .filter(|s| !levels.contains_key(&s.code))
            .map(|s| s.code.as_str())
            .collect();
        return Err(ValidationError::Hierarchy(format!(
            "units unreachable from a root (cycle?): {}",
            unreachable.join(", ")
        )));
    }

    let parent_ids: Vec<Option<Uid>> = sources
        .iter()
        .map(|s| {
            s.parent
                .as_deref()
                .and_then(|p| id_by_code.get(p).map(|id| (*id).clone()))
        })
        .collect();

    let mut slots: Vec<Option<(OrgUnitSource, Uid, Option<Uid>)>> = sources
        .into_iter()
        .zip(ids)
        .zip(parent_ids)
        .map(|((s, id), parent)| Some((s, id, parent)))
        .collect();

    let units = ordered
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .map(|(source, id, parent)| OrgUnit {
            level: levels.get(&source.code).copied().unwrap_or(1),
            id,
            parent,
            code: source.code,
            name: source.name,
            short_name: source.short_name,
            geometry: source.geometry,
        })
        .collect();

    Ok(units)
}

/// Number of levels in an ordered hierarchy
pub fn depth(units: &[OrgUnit]) -> usize {
    units.iter().map(|u| u.level).max().unwrap_or(0)
}
