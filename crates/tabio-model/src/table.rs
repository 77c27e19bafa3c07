//! The table container.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::column::{CellValue, Column};
use crate::error::{Result, TableError};

/// An ordered set of equally long, uniquely named columns.
///
/// Tables are only built through [`Table::from_columns`], which checks the
/// shape invariants once; a `Table` value is never partially constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Builds a table from columns in the given order.
    ///
    /// # Errors
    ///
    /// - [`TableError::DuplicateColumn`] if two columns share a name
    /// - [`TableError::MaskLengthMismatch`] if a mask does not match its values
    /// - [`TableError::RowCountMismatch`] if columns differ in length
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        let expected = columns.first().map_or(0, Column::len);
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
            if column.mask.len() != column.len() {
                return Err(TableError::MaskLengthMismatch {
                    column: column.name.clone(),
                    values: column.len(),
                    mask: column.mask.len(),
                });
            }
            if column.len() != expected {
                return Err(TableError::RowCountMismatch {
                    column: column.name.clone(),
                    expected,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// A table with no columns and no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Cell at `row` of column `name`.
    pub fn cell(&self, row: usize, name: &str) -> Option<CellValue<'_>> {
        self.column(name)?.get(row)
    }

    /// Cells of one row, in column order.
    pub fn row(&self, row: usize) -> Option<Vec<CellValue<'_>>> {
        if row >= self.num_rows() {
            return None;
        }
        self.columns.iter().map(|c| c.get(row)).collect()
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}
