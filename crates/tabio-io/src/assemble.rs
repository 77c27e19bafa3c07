//! Final table construction.

use tabio_model::{Column, Table};
use tracing::debug;

use crate::error::{ReadError, Result};

/// Builds a table from converted columns, keeping their order.
///
/// Every column's values and mask must have the first column's row count.
/// All offending columns are reported together.
pub fn assemble(columns: Vec<Column>) -> Result<Table> {
    let Some(expected) = columns.first().map(|c| c.data.len()) else {
        return Ok(Table::empty());
    };

    let offending: Vec<String> = columns
        .iter()
        .filter(|c| c.data.len() != expected || c.mask.len() != expected)
        .map(|c| c.name.clone())
        .collect();
    if !offending.is_empty() {
        return Err(ReadError::Structural {
            message: format!("expected {expected} rows and mask entries in every column"),
            columns: offending,
        });
    }

    let table = Table::from_columns(columns)?;
    debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "assembled table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use tabio_model::{ColumnData, Mask};

    use super::*;

    #[test]
    fn test_preserves_order() {
        let table = assemble(vec![
            Column::valid("b", ColumnData::Int(vec![1, 2])),
            Column::valid("a", ColumnData::Bool(vec![true, false])),
        ])
        .unwrap();
        assert_eq!(table.column_names(), vec!["b", "a"]);
        assert_eq!(table.shape(), (2, 2));
    }

    #[test]
    fn test_reports_every_offending_column() {
        let err = assemble(vec![
            Column::valid("a", ColumnData::Int(vec![1, 2])),
            Column::valid("b", ColumnData::Int(vec![1])),
            Column::new("c", ColumnData::Int(vec![1, 2]), Mask::all_valid(3)),
        ])
        .unwrap_err();
        match err {
            ReadError::Structural { columns, .. } => assert_eq!(columns, vec!["b", "c"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_names_are_structural() {
        let err = assemble(vec![
            Column::valid("a", ColumnData::Int(vec![1])),
            Column::valid("a", ColumnData::Int(vec![2])),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Structural);
    }

    #[test]
    fn test_zero_rows_is_legal() {
        let table = assemble(vec![Column::valid("a", ColumnData::Text(Vec::new()))]).unwrap();
        assert_eq!(table.shape(), (0, 1));
        assert!(table.columns()[0].mask.is_empty());
    }

    #[test]
    fn test_no_columns() {
        assert_eq!(assemble(Vec::new()).unwrap().shape(), (0, 0));
    }
}
