//! Tabular records
//!
//! A [`Table`] holds a dataset in wide form: a fixed header and rows of
//! optional text cells. A [`LongRecord`] is one (entity, dimension..., variable,
//! value) observation produced by reshaping a table.

use super::errors::ValidationError;

/// Wide table with optional text cells
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Creates a table, padding or truncating each row to the header width
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, or `UnknownColumn`
    pub fn column_index(&self, name: &str) -> Result<usize, ValidationError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ValidationError::UnknownColumn(name.to_string()))
    }

    /// Returns a copy without the named columns; names not present are ignored
    pub fn without_columns(&self, names: &[String]) -> Table {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !names.contains(c))
            .map(|(i, _)| i)
            .collect();

        Table {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Number of present (non-missing) cells outside the given columns
    pub fn present_cells_outside(&self, excluded: &[usize]) -> usize {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(i, cell)| !excluded.contains(i) && cell.is_some())
                    .count()
            })
            .sum()
    }
}

/// One long-form observation
///
/// `id_values` is parallel to the id columns the record was reshaped with.
/// Missing id cells are carried as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRecord {
    pub id_values: Vec<String>,
    pub variable: String,
    pub value: String,
}

impl LongRecord {
    /// Value of the id column at `index`
    pub fn id(&self, index: usize) -> Option<&str> {
        self.id_values.get(index).map(String::as_str)
    }
}
