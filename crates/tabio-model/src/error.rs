//! Error types for table construction.

use thiserror::Error;

/// Errors raised when columns do not form a consistent table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Two columns share a name.
    #[error("duplicate column name: {name}")]
    DuplicateColumn { name: String },

    /// A column's mask does not line up with its values.
    #[error("column '{column}' has {values} values but a mask of length {mask}")]
    MaskLengthMismatch {
        column: String,
        values: usize,
        mask: usize,
    },

    /// A column's row count differs from the first column's.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl TableError {
    /// Name of the column the error refers to.
    pub fn column(&self) -> &str {
        match self {
            Self::DuplicateColumn { name } => name,
            Self::MaskLengthMismatch { column, .. } | Self::RowCountMismatch { column, .. } => {
                column
            }
        }
    }
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TableError::RowCountMismatch {
            column: "b".to_string(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "column 'b' has 2 rows, expected 3");
        assert_eq!(err.column(), "b");
    }
}
