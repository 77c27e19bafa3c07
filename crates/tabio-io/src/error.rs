//! Error types for table reading.

use std::fmt;
use std::path::PathBuf;

use tabio_model::TableError;
use thiserror::Error;

/// Location in the source text, as far as it is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    /// 1-based line number.
    pub line: u64,
    /// Byte offset from the start of the (BOM-stripped) input.
    pub byte: u64,
    /// 0-based record index, header included.
    pub record: u64,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, byte {}, record {}",
            self.line, self.byte, self.record
        )
    }
}

/// Broad category of a [`ReadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The format identifier could not be resolved.
    Resolution,
    /// Options were rejected before any input was touched.
    Options,
    /// The source could not be opened or read.
    Io,
    /// The parsing engine rejected the input.
    Parse,
    /// A column could not be converted to a table type.
    TypeMapping,
    /// Converted columns do not form a consistent table.
    Structural,
}

/// Errors that can occur while resolving a format and reading a table.
#[derive(Debug, Error)]
pub enum ReadError {
    // === Resolution Errors ===
    /// No reader is registered under this identifier.
    #[error("unknown format '{format}' (registered: {registered})")]
    UnknownFormat { format: String, registered: String },

    /// A reader is already registered under this identifier.
    #[error("format '{format}' is already registered")]
    DuplicateFormat { format: String },

    /// The identifier cannot be used as a registry key.
    #[error("invalid format identifier '{format}': {reason}")]
    InvalidFormatName { format: String, reason: String },

    /// No registered reader recognizes the source.
    #[error("could not identify a format for {source_name}")]
    FormatNotIdentified { source_name: String },

    /// Several registered readers recognize the source.
    #[error("format for {source_name} is ambiguous: {}", .candidates.join(", "))]
    AmbiguousFormat {
        source_name: String,
        candidates: Vec<String>,
    },

    // === Option Errors ===
    /// The option name is not part of the options contract.
    #[error("unknown option '{key}'")]
    UnknownOption { key: String },

    /// The option value could not be interpreted.
    #[error("invalid value '{value}' for option '{key}': {reason}")]
    InvalidOptionValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The option has no equivalent in this reader's engine.
    #[error("option '{option}' is not supported by format '{format}': {reason}")]
    UnsupportedOption {
        format: String,
        option: String,
        reason: String,
    },

    /// Options contradict each other or the input layout.
    #[error("conflicting options: {reason}")]
    ConflictingOptions { reason: String },

    /// An options file could not be parsed.
    #[error("invalid options file {path}: {message}")]
    OptionsFile { path: PathBuf, message: String },

    // === I/O Errors ===
    /// Source file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read the source.
    #[error("failed to read {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    // === Parse Errors ===
    /// The input is malformed.
    #[error("parse error{}: {message}", .position.map(|p| format!(" at {p}")).unwrap_or_default())]
    Parse {
        message: String,
        position: Option<SourcePosition>,
    },

    // === Type Mapping Errors ===
    /// The engine produced a column type with no table equivalent.
    #[error("unsupported column type '{dtype}' in column '{column}'")]
    UnsupportedColumnType { column: String, dtype: String },

    /// A value does not fit the table's integer type.
    #[error("type overflow in column '{column}' at row {row}: {value} does not fit in i64")]
    TypeOverflow {
        column: String,
        row: usize,
        value: String,
    },

    /// An option refers to a column the input does not have.
    #[error("option '{option}' refers to unknown column '{column}'")]
    UnknownColumn { option: String, column: String },

    // === Structural Errors ===
    /// Converted columns do not form a consistent table.
    #[error("structural inconsistency in columns [{}]: {message}", .columns.join(", "))]
    Structural {
        message: String,
        columns: Vec<String>,
    },
}

impl ReadError {
    /// Taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFormat { .. }
            | Self::DuplicateFormat { .. }
            | Self::InvalidFormatName { .. }
            | Self::FormatNotIdentified { .. }
            | Self::AmbiguousFormat { .. } => ErrorKind::Resolution,
            Self::UnknownOption { .. }
            | Self::InvalidOptionValue { .. }
            | Self::UnsupportedOption { .. }
            | Self::ConflictingOptions { .. }
            | Self::OptionsFile { .. } => ErrorKind::Options,
            Self::FileNotFound { .. } | Self::Io { .. } => ErrorKind::Io,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::UnsupportedColumnType { .. }
            | Self::TypeOverflow { .. }
            | Self::UnknownColumn { .. } => ErrorKind::TypeMapping,
            Self::Structural { .. } => ErrorKind::Structural,
        }
    }

    /// Create a Parse error without position information.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position: None,
        }
    }

    /// Create an UnsupportedOption error.
    pub fn unsupported_option(
        format: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedOption {
            format: format.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConflictingOptions error.
    pub fn conflicting(reason: impl Into<String>) -> Self {
        Self::ConflictingOptions {
            reason: reason.into(),
        }
    }

    /// Create an InvalidOptionValue error.
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOptionValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownColumn error.
    pub fn unknown_column(option: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            option: option.into(),
            column: column.into(),
        }
    }
}

impl From<TableError> for ReadError {
    fn from(err: TableError) -> Self {
        Self::Structural {
            columns: vec![err.column().to_string()],
            message: err.to_string(),
        }
    }
}

impl From<polars::prelude::PolarsError> for ReadError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::parse(err.to_string())
    }
}

/// Result type for read operations.
pub type Result<T> = std::result::Result<T, ReadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReadError::UnknownFormat {
            format: "nonexistent.csv".to_string(),
            registered: "polars.csv".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown format 'nonexistent.csv' (registered: polars.csv)"
        );
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }

    #[test]
    fn test_parse_error_with_position() {
        let err = ReadError::Parse {
            message: "found record with 3 fields, expected 2".to_string(),
            position: Some(SourcePosition {
                line: 3,
                byte: 8,
                record: 2,
            }),
        };
        assert_eq!(
            err.to_string(),
            "parse error at line 3, byte 8, record 2: found record with 3 fields, expected 2"
        );
        assert_eq!(ReadError::parse("bad").to_string(), "parse error: bad");
    }

    #[test]
    fn test_error_from_table_error() {
        let table_err = TableError::DuplicateColumn {
            name: "a".to_string(),
        };
        let err: ReadError = table_err.into();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(matches!(err, ReadError::Structural { ref columns, .. } if columns == &["a"]));
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ComputeError("bad row".into());
        let err: ReadError = polars_err.into();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
