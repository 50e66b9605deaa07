//! Domain identifier types with validation
//!
//! The target system identifies every metadata object by a short alphanumeric
//! identifier whose first character is a letter. [`Uid`] wraps such an
//! identifier and checks its syntax on construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default identifier length used by the target system
pub const DEFAULT_UID_LENGTH: usize = 11;

/// Object identifier newtype wrapper
///
/// # Examples
///
/// ```
/// use hisseed::domain::ids::Uid;
/// use std::str::FromStr;
///
/// let uid = Uid::from_str("ImspTQPwCqd").unwrap();
/// assert_eq!(uid.as_str(), "ImspTQPwCqd");
///
/// assert!(Uid::from_str("1mspTQPwCqd").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    /// Creates a new Uid of any length, checking the character classes
    ///
    /// # Returns
    ///
    /// Returns `Ok(Uid)` if the first character is an ASCII letter and the rest
    /// are ASCII letters or digits, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let mut chars = id.chars();

        match chars.next() {
            None => return Err("Identifier cannot be empty".to_string()),
            Some(first) if !first.is_ascii_alphabetic() => {
                return Err(format!("Identifier '{id}' must start with a letter"));
            }
            Some(_) => {}
        }

        if let Some(bad) = chars.find(|c| !c.is_ascii_alphanumeric()) {
            return Err(format!(
                "Identifier '{id}' contains invalid character '{bad}'"
            ));
        }

        Ok(Self(id))
    }

    /// Creates a Uid and additionally checks its length
    pub fn with_length(id: impl Into<String>, length: usize) -> Result<Self, String> {
        let uid = Self::new(id)?;
        if uid.0.len() != length {
            return Err(format!(
                "Identifier '{}' must be {} characters, got {}",
                uid.0,
                length,
                uid.0.len()
            ));
        }
        Ok(uid)
    }

    /// Wraps a string produced by the generator, which is valid by construction
    pub(crate) fn from_generated(id: String) -> Self {
        Self(id)
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Uid {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.0
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
