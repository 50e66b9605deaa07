//! Cross-dataset inner joins
//!
//! Observations are resolved against reference tables (code → identifier
//! maps) with a plain equality inner join. Rows without a match are dropped,
//! not reported as errors; the [`JoinReport`] attached to every join lets the
//! caller compare row counts and decide what a drop means.

use crate::domain::{Result, SeedError};
use std::collections::HashMap;
use std::hash::Hash;

/// Row counts observed by one join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinReport {
    pub left_rows: usize,
    pub right_rows: usize,
    /// Left rows with at least one match
    pub matched_left_rows: usize,
    pub output_rows: usize,
}

impl JoinReport {
    /// Left rows that found no match
    pub fn dropped(&self) -> usize {
        self.left_rows - self.matched_left_rows
    }

    /// Surfaces dropped rows
    ///
    /// Drops are logged as a warning. In strict mode they are returned as
    /// [`SeedError::JoinMismatch`] instead.
    pub fn check(&self, context: &str, strict: bool) -> Result<()> {
        if self.dropped() == 0 {
            return Ok(());
        }

        if strict {
            return Err(SeedError::JoinMismatch {
                context: context.to_string(),
                dropped: self.dropped(),
                left_rows: self.left_rows,
            });
        }

        tracing::warn!(
            context = context,
            dropped = self.dropped(),
            left_rows = self.left_rows,
            output_rows = self.output_rows,
            "Inner join dropped rows without a match"
        );
        Ok(())
    }
}

/// Joined row pairs plus the counts that produced them
#[derive(Debug, Clone)]
pub struct Joined<L, R> {
    pub rows: Vec<(L, R)>,
    pub report: JoinReport,
}

/// Equality inner join
///
/// Output order is left order, then right order among the matches of one
/// left row. Duplicate keys produce the Cartesian product of their matches.
///
/// # Examples
///
/// ```
/// use hisseed::core::join::inner_join;
///
/// let observations = vec![("SLE", "10"), ("XXX", "3")];
/// let org_units = vec![("SLE", "abc12345678")];
///
/// let joined = inner_join(&observations, &org_units, |o| o.0, |u| u.0);
/// assert_eq!(joined.rows.len(), 1);
/// assert_eq!(joined.report.dropped(), 1);
/// ```
pub fn inner_join<L, R, K, FL, FR>(
    left: &[L],
    right: &[R],
    left_key: FL,
    right_key: FR,
) -> Joined<L, R>
where
    L: Clone,
    R: Clone,
    K: Eq + Hash,
    FL: Fn(&L) -> K,
    FR: Fn(&R) -> K,
{
    let mut index: HashMap<K, Vec<&R>> = HashMap::with_capacity(right.len());
    for row in right {
        index.entry(right_key(row)).or_default().push(row);
    }

    let mut rows = Vec::new();
    let mut matched_left_rows = 0;

    for l in left {
        if let Some(matches) = index.get(&left_key(l)) {
            matched_left_rows += 1;
            rows.extend(matches.iter().map(|r| (l.clone(), (*r).clone())));
        }
    }

    let report = JoinReport {
        left_rows: left.len(),
        right_rows: right.len(),
        matched_left_rows,
        output_rows: rows.len(),
    };

    Joined { rows, report }
}

/// Joins against a unique-key lookup map
///
/// Equivalent to [`inner_join`] when the right side has no duplicate keys,
/// which is the case for code → identifier maps.
pub fn join_lookup<L, V, FL>(
    left: Vec<L>,
    lookup: &HashMap<String, V>,
    left_key: FL,
) -> Joined<L, V>
where
    V: Clone,
    FL: Fn(&L) -> &str,
{
    let left_rows = left.len();
    let rows: Vec<(L, V)> = left
        .into_iter()
        .filter_map(|l| {
            let value = lookup.get(left_key(&l))?.clone();
            Some((l, value))
        })
        .collect();

    let report = JoinReport {
        left_rows,
        right_rows: lookup.len(),
        matched_left_rows: rows.len(),
        output_rows: rows.len(),
    };

    Joined { rows, report }
}
