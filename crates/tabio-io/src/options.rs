//! Options shared by every table reader.
//!
//! The contract is format-independent: each reader decides in
//! [`TableReader::validate`](crate::TableReader::validate) which options its
//! engine can honor and rejects the rest before touching the input.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tabio_model::ColumnType;

use crate::error::{ReadError, Result};

/// Option keys accepted by [`ReadOptions::set`].
pub const OPTION_KEYS: &[&str] = &[
    "delimiter",
    "header",
    "null_values",
    "dtypes.<column>",
    "skip_rows",
    "quote_char",
    "comment",
    "names",
    "include_names",
    "encoding",
    "parse_dates",
];

/// Options for reading a table.
///
/// Deserializes from TOML (see [`ReadOptions::from_toml_str`]); unknown keys
/// are rejected rather than ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadOptions {
    /// Field separator (default `,`).
    pub delimiter: char,
    /// Whether the first record holds column names (default true).
    pub header: bool,
    /// Strings read as missing values (default: the empty string).
    pub null_values: Vec<String>,
    /// Explicit column types, keyed by final column name.
    pub dtypes: BTreeMap<String, ColumnType>,
    /// Physical lines dropped before the header.
    pub skip_rows: usize,
    /// Quote character (default `"`); `None` disables quoting.
    pub quote_char: Option<char>,
    /// Lines starting with this character are skipped.
    pub comment: Option<char>,
    /// Column names replacing the header (or the `col1..colN` defaults).
    pub names: Option<Vec<String>>,
    /// Columns to keep, in output order.
    pub include_names: Option<Vec<String>>,
    /// Text encoding of the input (default `utf-8`).
    pub encoding: String,
    /// Let the engine infer date and datetime columns.
    pub parse_dates: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            header: true,
            null_values: vec![String::new()],
            dtypes: BTreeMap::new(),
            skip_rows: 0,
            quote_char: Some('"'),
            comment: None,
            names: None,
            include_names: None,
            encoding: "utf-8".to_string(),
            parse_dates: false,
        }
    }
}

impl ReadOptions {
    /// Create options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    #[must_use]
    pub fn with_null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Force the type of one column.
    #[must_use]
    pub fn with_dtype(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.dtypes.insert(column.into(), column_type);
        self
    }

    #[must_use]
    pub fn with_skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    #[must_use]
    pub fn with_quote_char(mut self, quote: Option<char>) -> Self {
        self.quote_char = quote;
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: Option<char>) -> Self {
        self.comment = comment;
        self
    }

    #[must_use]
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_include_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    #[must_use]
    pub fn with_parse_dates(mut self, enable: bool) -> Self {
        self.parse_dates = enable;
        self
    }

    /// Applies one `key = value` pair given as text.
    ///
    /// Column overrides use the key `dtypes.<column>`. List-valued options
    /// (`null_values`, `names`, `include_names`) take comma-separated items.
    ///
    /// # Errors
    ///
    /// [`ReadError::UnknownOption`] for keys outside the contract and
    /// [`ReadError::InvalidOptionValue`] for values that do not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(column) = key.strip_prefix("dtypes.") {
            if column.is_empty() {
                return Err(ReadError::invalid_value(key, value, "missing column name"));
            }
            let column_type = value
                .parse::<ColumnType>()
                .map_err(|e| ReadError::invalid_value(key, value, e.to_string()))?;
            self.dtypes.insert(column.to_string(), column_type);
            return Ok(());
        }
        match key {
            "delimiter" => self.delimiter = parse_char(key, value)?,
            "header" => self.header = parse_bool(key, value)?,
            "null_values" => self.null_values = split_list(value),
            "skip_rows" => {
                self.skip_rows = value
                    .trim()
                    .parse()
                    .map_err(|_| ReadError::invalid_value(key, value, "expected a row count"))?;
            }
            "quote_char" => self.quote_char = parse_optional_char(key, value)?,
            "comment" => self.comment = parse_optional_char(key, value)?,
            "names" => self.names = Some(split_list(value)),
            "include_names" => self.include_names = Some(split_list(value)),
            "encoding" => self.encoding = value.trim().to_string(),
            "parse_dates" => self.parse_dates = parse_bool(key, value)?,
            _ => {
                return Err(ReadError::UnknownOption {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Parses options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ReadError::OptionsFile {
            path: "<inline>".into(),
            message: e.message().to_string(),
        })
    }

    /// Loads options from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReadError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ReadError::Io {
                    source_name: path.display().to_string(),
                    source: e,
                }
            }
        })?;
        toml::from_str(&text).map_err(|e| ReadError::OptionsFile {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Whether `value` is one of the configured null sentinels.
    pub fn is_null_value(&self, value: &str) -> bool {
        self.null_values.iter().any(|v| v == value)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(|item| item.trim().to_string()).collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ReadError::invalid_value(key, value, "expected true or false")),
    }
}

fn parse_char(key: &str, value: &str) -> Result<char> {
    if matches!(value, "\\t" | "tab") {
        return Ok('\t');
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ReadError::invalid_value(
            key,
            value,
            "expected a single character",
        )),
    }
}

fn parse_optional_char(key: &str, value: &str) -> Result<Option<char>> {
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_char(key, value).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ReadOptions::default();
        assert_eq!(options.delimiter, ',');
        assert!(options.header);
        assert_eq!(options.null_values, vec![String::new()]);
        assert_eq!(options.quote_char, Some('"'));
        assert!(options.is_null_value(""));
    }

    #[test]
    fn test_set_known_keys() {
        let mut options = ReadOptions::new();
        options.set("delimiter", "\\t").unwrap();
        options.set("header", "no").unwrap();
        options.set("null_values", "NA,,-").unwrap();
        options.set("dtypes.a", "int").unwrap();
        options.set("skip_rows", "2").unwrap();
        options.set("quote_char", "none").unwrap();
        options.set("names", "x, y").unwrap();

        assert_eq!(options.delimiter, '\t');
        assert!(!options.header);
        assert_eq!(options.null_values, vec!["NA", "", "-"]);
        assert_eq!(options.dtypes.get("a"), Some(&ColumnType::Int));
        assert_eq!(options.skip_rows, 2);
        assert_eq!(options.quote_char, None);
        assert_eq!(options.names, Some(vec!["x".to_string(), "y".to_string()]));
    }

    #[test]
    fn test_set_unknown_key_fails() {
        let err = ReadOptions::new().set("fast_mode", "true").unwrap_err();
        assert!(matches!(err, ReadError::UnknownOption { key } if key == "fast_mode"));
    }

    #[test]
    fn test_set_invalid_value_fails() {
        let mut options = ReadOptions::new();
        assert!(matches!(
            options.set("delimiter", ";;"),
            Err(ReadError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            options.set("dtypes.a", "decimal"),
            Err(ReadError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            options.set("skip_rows", "-1"),
            Err(ReadError::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn test_from_toml() {
        let options = ReadOptions::from_toml_str(
            r#"
            delimiter = ";"
            null_values = ["", "NA"]

            [dtypes]
            id = "int"
            seen = "datetime[ms, UTC]"
            "#,
        )
        .unwrap();
        assert_eq!(options.delimiter, ';');
        assert!(options.header);
        assert_eq!(options.dtypes.len(), 2);
        assert!(options.dtypes["seen"].is_temporal());
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = ReadOptions::from_toml_str("delimter = \";\"").unwrap_err();
        assert!(matches!(err, ReadError::OptionsFile { ref message, .. } if message.contains("delimter")));
    }
}
