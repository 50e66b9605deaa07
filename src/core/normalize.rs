//! Schema-constrained record normalization
//!
//! Before a batch is sent, each constrained text field is truncated to the
//! maximum length the target's schema reports, required fields are checked
//! and unique fields are checked for collisions introduced by truncation.
//! This is a local pre-flight check; the target still validates the payload.

use crate::domain::ValidationError;
use std::collections::HashMap;

/// Field constraints reported by the target's schema endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConstraint {
    /// Field name, e.g. `name` or `shortName`
    pub name: String,

    /// Maximum length in characters
    pub max_length: usize,

    pub required: bool,

    pub unique: bool,

    pub property_type: Option<String>,
}

impl SchemaConstraint {
    /// Creates a constraint directly, for fields whose schema is known
    pub fn new(name: impl Into<String>, max_length: usize) -> Self {
        Self {
            name: name.into(),
            max_length,
            required: false,
            unique: false,
            property_type: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Truncates `value` to at most `max` characters
pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}

/// Normalizes one field of every record against a schema constraint
///
/// `field` selects the constrained text field of a record.
///
/// # Errors
///
/// - [`ValidationError::MissingRequiredField`] if the constraint is required
///   and a record's field is blank
/// - [`ValidationError::DuplicateKey`] if the constraint is unique and two or
///   more records share a value after truncation
///
/// # Examples
///
/// ```
/// use hisseed::core::normalize::{normalize, SchemaConstraint};
///
/// let names = vec!["Estimated incidence".to_string(), "Notified cases".to_string()];
/// let constraint = SchemaConstraint::new("shortName", 9).unique();
/// let names = normalize(names, &constraint, |n| n).unwrap();
/// assert_eq!(names, vec!["Estimated", "Notified "]);
/// ```
pub fn normalize<R, F>(
    mut records: Vec<R>,
    constraint: &SchemaConstraint,
    mut field: F,
) -> Result<Vec<R>, ValidationError>
where
    F: FnMut(&mut R) -> &mut String,
{
    let mut truncated = 0usize;
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (index, record) in records.iter_mut().enumerate() {
        let value = field(record);

        if constraint.required && value.trim().is_empty() {
            return Err(ValidationError::MissingRequiredField {
                field: constraint.name.clone(),
                index,
            });
        }

        if value.chars().count() > constraint.max_length {
            *value = truncate_chars(value, constraint.max_length);
            truncated += 1;
        }

        if constraint.unique && !value.is_empty() {
            *seen.entry(value.clone()).or_insert(0) += 1;
        }
    }

    if let Some((value, count)) = first_duplicate(&mut records, &seen, &mut field) {
        return Err(ValidationError::DuplicateKey {
            field: constraint.name.clone(),
            value,
            count,
            max_length: constraint.max_length,
        });
    }

    if truncated > 0 {
        tracing::debug!(
            field = %constraint.name,
            max_length = constraint.max_length,
            truncated,
            "Truncated values to schema length"
        );
    }

    Ok(records)
}

// Reports the duplicate that occurs first in record order, so the error is stable
fn first_duplicate<R, F>(
    records: &mut [R],
    seen: &HashMap<String, usize>,
    field: &mut F,
) -> Option<(String, usize)>
where
    F: FnMut(&mut R) -> &mut String,
{
    records.iter_mut().find_map(|record| {
        let value = field(record);
        match seen.get(value.as_str()) {
            Some(&count) if count > 1 => Some((value.clone(), count)),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        code: String,
        name: String,
    }

    fn row(code: &str, name: &str) -> Row {
        Row {
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    #[test_case("abcdef", 3, "abc" ; "longer is truncated")]
    #[test_case("abc", 3, "abc" ; "exact length kept")]
    #[test_case("ab", 3, "ab" ; "shorter kept")]
    #[test_case("Côte d'Ivoire", 4, "Côte" ; "counts characters not bytes")]
    #[test_case("", 0, "" ; "empty")]
    fn test_truncate_chars(input: &str, max: usize, expected: &str) {
        assert_eq!(truncate_chars(input, max), expected);
    }

    #[test]
    fn test_normalize_truncates_to_exact_length() {
        let rows = vec![row("a", "x".repeat(300).as_str()), row("b", "short")];
        let constraint = SchemaConstraint::new("name", 230);

        let rows = normalize(rows, &constraint, |r| &mut r.name).unwrap();
        assert_eq!(rows[0].name.chars().count(), 230);
        assert_eq!(rows[1].name, "short");
    }

    #[test]
    fn test_normalize_duplicate_after_truncation() {
        let rows = vec![
            row("a", "Estimated incidence, all forms"),
            row("b", "Estimated incidence, HIV-positive"),
        ];
        let constraint = SchemaConstraint::new("shortName", 19).unique();

        let err = normalize(rows, &constraint, |r| &mut r.name).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateKey {
                field: "shortName".to_string(),
                value: "Estimated incidence".to_string(),
                count: 2,
                max_length: 19,
            }
        );
    }

    #[test]
    fn test_normalize_duplicates_allowed_when_not_unique() {
        let rows = vec![row("a", "same"), row("b", "same")];
        let constraint = SchemaConstraint::new("description", 50);
        assert!(normalize(rows, &constraint, |r| &mut r.name).is_ok());
    }

    #[test]
    fn test_normalize_missing_required() {
        let rows = vec![row("a", "fine"), row("", "no code")];
        let constraint = SchemaConstraint::new("code", 50).required();

        let err = normalize(rows, &constraint, |r| &mut r.code).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredField {
                field: "code".to_string(),
                index: 1,
            }
        );
    }
}
