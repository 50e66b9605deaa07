//! User and user role domain models

use super::ids::Uid;
use crate::config::SecretString;
use serde::Deserialize;

/// One row of the user roster CSV
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "firstName", alias = "first_name", alias = "firstname")]
    pub first_name: String,

    pub surname: String,

    pub username: String,

    #[serde(default)]
    pub email: Option<String>,

    /// Code of the user's home organisation unit; roots when absent
    #[serde(default, rename = "orgUnit", alias = "org_unit")]
    pub org_unit: Option<String>,
}

/// User role with its granted authorities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    pub id: Uid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub authorities: Vec<String>,
}

/// User account ready for import
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uid,
    pub code: String,
    pub first_name: String,
    pub surname: String,
    pub username: String,
    pub email: Option<String>,
    pub password: SecretString,
    pub roles: Vec<Uid>,
    pub org_units: Vec<Uid>,
}

impl User {
    /// Builds a user from a roster row
    ///
    /// The user's code is the upper-cased username, which keeps it stable
    /// across runs.
    pub fn from_record(
        id: Uid,
        record: UserRecord,
        password: SecretString,
        roles: Vec<Uid>,
        org_units: Vec<Uid>,
    ) -> Self {
        Self {
            id,
            code: record.username.to_uppercase(),
            first_name: record.first_name,
            surname: record.surname,
            username: record.username,
            email: record.email.filter(|e| !e.trim().is_empty()),
            password,
            roles,
            org_units,
        }
    }
}
