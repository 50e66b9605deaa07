//! Wide-to-long reshaping
//!
//! Every column not named as an id column is a variable column. For each row,
//! one [`LongRecord`] is emitted per variable column whose cell is present.
//! Output follows source row order, then source column order.

use crate::domain::{LongRecord, Table, ValidationError};

/// Lazy long-form view over a wide table
///
/// `Melt` borrows the table and walks it cell by cell. Cloning it restarts
/// from the current position, and [`reshape`] can be called again on the
/// same table to regenerate the sequence from the beginning.
#[derive(Debug, Clone)]
pub struct Melt<'a> {
    table: &'a Table,
    id_columns: Vec<String>,
    id_indices: Vec<usize>,
    value_indices: Vec<usize>,
    row: usize,
    col: usize,
}

impl<'a> Melt<'a> {
    /// Names of the id columns, parallel to [`LongRecord::id_values`]
    pub fn id_columns(&self) -> &[String] {
        &self.id_columns
    }

    /// Names of the variable columns, in source order
    pub fn variable_columns(&self) -> Vec<&'a str> {
        self.value_indices
            .iter()
            .map(|&i| self.table.columns()[i].as_str())
            .collect()
    }

    /// Number of records the full sequence yields
    pub fn expected_len(&self) -> usize {
        self.table.present_cells_outside(&self.id_indices)
    }
}

impl<'a> Iterator for Melt<'a> {
    type Item = LongRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let rows = self.table.rows();

        while self.row < rows.len() {
            let row = &rows[self.row];

            while self.col < self.value_indices.len() {
                let idx = self.value_indices[self.col];
                self.col += 1;

                if let Some(value) = &row[idx] {
                    return Some(LongRecord {
                        id_values: self
                            .id_indices
                            .iter()
                            .map(|&i| row[i].clone().unwrap_or_default())
                            .collect(),
                        variable: self.table.columns()[idx].clone(),
                        value: value.clone(),
                    });
                }
            }

            self.row += 1;
            self.col = 0;
        }

        None
    }
}

/// Reshapes a wide table into long records
///
/// # Errors
///
/// Returns [`ValidationError::UnknownColumn`] if an id column is not in the table
///
/// # Examples
///
/// ```
/// use hisseed::core::reshape::reshape;
/// use hisseed::domain::Table;
///
/// let table = Table::new(
///     vec!["country".into(), "y2015".into(), "y2016".into()],
///     vec![vec![Some("X".into()), Some("10".into()), None]],
/// );
/// let records: Vec<_> = reshape(&table, &["country"]).unwrap().collect();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].variable, "y2015");
/// ```
pub fn reshape<'a, S: AsRef<str>>(
    table: &'a Table,
    id_columns: &[S],
) -> Result<Melt<'a>, ValidationError> {
    let id_indices = id_columns
        .iter()
        .map(|c| table.column_index(c.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let value_indices = (0..table.columns().len())
        .filter(|i| !id_indices.contains(i))
        .collect();

    Ok(Melt {
        table,
        id_columns: id_columns.iter().map(|c| c.as_ref().to_string()).collect(),
        id_indices,
        value_indices,
        row: 0,
        col: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let table = Table::new(
            vec!["country".into(), "y2015".into(), "y2016".into()],
            vec![vec![cell("X"), cell("10"), None]],
        );

        let records: Vec<_> = reshape(&table, &["country"]).unwrap().collect();
        assert_eq!(
            records,
            vec![LongRecord {
                id_values: vec!["X".to_string()],
                variable: "y2015".to_string(),
                value: "10".to_string(),
            }]
        );
    }

    #[test]
    fn test_order_is_row_then_column() {
        let table = Table::new(
            vec!["iso3".into(), "year".into(), "a".into(), "b".into()],
            vec![
                vec![cell("SLE"), cell("2015"), cell("1"), cell("2")],
                vec![cell("GHA"), cell("2015"), None, cell("4")],
            ],
        );

        let melt = reshape(&table, &["iso3", "year"]).unwrap();
        assert_eq!(melt.id_columns(), &["iso3".to_string(), "year".to_string()]);
        assert_eq!(melt.variable_columns(), vec!["a", "b"]);
        assert_eq!(melt.expected_len(), 3);

        let got: Vec<(String, String, String)> = melt
            .map(|r| (r.id_values[0].clone(), r.variable, r.value))
            .collect();
        assert_eq!(
            got,
            vec![
                ("SLE".into(), "a".into(), "1".into()),
                ("SLE".into(), "b".into(), "2".into()),
                ("GHA".into(), "b".into(), "4".into()),
            ]
        );
    }

    #[test]
    fn test_unknown_id_column() {
        let table = Table::new(vec!["iso3".into()], vec![]);
        let err = reshape(&table, &["country"]).unwrap_err();
        assert_eq!(err, ValidationError::UnknownColumn("country".to_string()));
    }

    #[test]
    fn test_reshape_is_restartable() {
        let table = Table::new(
            vec!["k".into(), "v1".into(), "v2".into()],
            vec![vec![cell("a"), cell("1"), cell("2")]],
        );
        let mut melt = reshape(&table, &["k"]).unwrap();
        let first = melt.next();
        let resumed = melt.clone();

        assert_eq!(resumed.count(), 1);
        assert_eq!(reshape(&table, &["k"]).unwrap().next(), first);
    }

    #[test]
    fn test_missing_id_cell_becomes_empty() {
        let table = Table::new(
            vec!["k".into(), "v".into()],
            vec![vec![None, cell("1")]],
        );
        let record = reshape(&table, &["k"]).unwrap().next().unwrap();
        assert_eq!(record.id(0), Some(""));
    }

    fn arb_table() -> impl Strategy<Value = Table> {
        (1usize..5, 0usize..12).prop_flat_map(|(value_cols, rows)| {
            let width = value_cols + 1;
            proptest::collection::vec(
                proptest::collection::vec(proptest::option::of("[0-9]{1,3}"), width),
                rows,
            )
            .prop_map(move |rows| {
                let mut columns = vec!["id".to_string()];
                columns.extend((0..value_cols).map(|i| format!("v{i}")));
                Table::new(columns, rows)
            })
        })
    }

    proptest! {
        #[test]
        fn prop_emits_exactly_present_cells(table in arb_table()) {
            let melt = reshape(&table, &["id"]).unwrap();
            let expected = melt.expected_len();
            let records: Vec<_> = melt.collect();

            prop_assert_eq!(records.len(), expected);
            prop_assert!(records.iter().all(|r| !r.variable.is_empty() && r.variable != "id"));
        }
    }
}
