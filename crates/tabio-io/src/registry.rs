//! Format registry: maps format identifiers to table readers.
//!
//! A registry is an explicit value. Populate it at startup, then share it
//! (for example behind an `Arc`) for reading; registration needs `&mut`, so
//! readers never observe a registry that is being modified.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tabio_model::Table;
use tracing::{debug, info, info_span};

use crate::csv::{POLARS_CSV_FORMAT, PolarsCsvReader};
use crate::error::{ReadError, Result};
use crate::options::ReadOptions;
use crate::source::{ReadSource, SourceOrigin};

/// A backend that can populate a [`Table`] from one input format.
pub trait TableReader: Send + Sync {
    /// One-line description shown in format listings.
    fn description(&self) -> &str;

    /// Whether this reader claims the source, judging by metadata only.
    fn identify(&self, _origin: &SourceOrigin<'_>) -> bool {
        false
    }

    /// Rejects options this reader cannot honor. Must not perform I/O.
    fn validate(&self, _options: &ReadOptions) -> Result<()> {
        Ok(())
    }

    /// Reads the whole source into a table.
    fn read(&self, source: ReadSource<'_>, options: &ReadOptions) -> Result<Table>;
}

/// Identifier and description of a registered format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    pub name: String,
    pub description: String,
}

/// Registry of table readers keyed by format identifier.
#[derive(Default)]
pub struct FormatRegistry {
    readers: BTreeMap<String, Arc<dyn TableReader>>,
}

impl FormatRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in readers (`polars.csv`).
    pub fn with_default_readers() -> Self {
        let mut registry = Self::new();
        registry
            .readers
            .insert(POLARS_CSV_FORMAT.to_string(), Arc::new(PolarsCsvReader::new()));
        registry
    }

    /// Registers a reader under `format`.
    ///
    /// # Errors
    ///
    /// [`ReadError::DuplicateFormat`] if the identifier is taken; use
    /// [`FormatRegistry::register_or_replace`] to overwrite deliberately.
    pub fn register(&mut self, format: &str, reader: impl TableReader + 'static) -> Result<()> {
        validate_format_name(format)?;
        if self.readers.contains_key(format) {
            return Err(ReadError::DuplicateFormat {
                format: format.to_string(),
            });
        }
        debug!(format, "registered table reader");
        self.readers.insert(format.to_string(), Arc::new(reader));
        Ok(())
    }

    /// Registers a reader, returning the one it replaced.
    pub fn register_or_replace(
        &mut self,
        format: &str,
        reader: impl TableReader + 'static,
    ) -> Result<Option<Arc<dyn TableReader>>> {
        validate_format_name(format)?;
        let previous = self.readers.insert(format.to_string(), Arc::new(reader));
        debug!(format, replaced = previous.is_some(), "registered table reader");
        Ok(previous)
    }

    /// Removes a reader.
    pub fn unregister(&mut self, format: &str) -> Result<Arc<dyn TableReader>> {
        self.readers
            .remove(format)
            .ok_or_else(|| self.unknown_format(format))
    }

    /// Looks up the reader for `format`.
    pub fn resolve(&self, format: &str) -> Result<Arc<dyn TableReader>> {
        self.readers
            .get(format)
            .cloned()
            .ok_or_else(|| self.unknown_format(format))
    }

    pub fn contains(&self, format: &str) -> bool {
        self.readers.contains_key(format)
    }

    pub fn len(&self) -> usize {
        self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    /// Registered formats, sorted by identifier.
    pub fn formats(&self) -> Vec<FormatInfo> {
        self.readers
            .iter()
            .map(|(name, reader)| FormatInfo {
                name: name.clone(),
                description: reader.description().to_string(),
            })
            .collect()
    }

    /// Formats whose reader claims `origin`.
    pub fn identify(&self, origin: &SourceOrigin<'_>) -> Vec<String> {
        self.readers
            .iter()
            .filter(|(_, reader)| reader.identify(origin))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Reads `source` with the reader registered as `format`.
    ///
    /// The format is resolved and the options validated before the source
    /// is opened.
    pub fn read(
        &self,
        format: &str,
        source: ReadSource<'_>,
        options: &ReadOptions,
    ) -> Result<Table> {
        let reader = self.resolve(format)?;
        let span = info_span!("read_table", format, source = %source.display_name());
        let _guard = span.enter();
        reader.validate(options)?;
        let table = reader.read(source, options)?;
        info!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            "table read"
        );
        Ok(table)
    }

    /// Reads `source` after identifying its format.
    ///
    /// # Errors
    ///
    /// [`ReadError::FormatNotIdentified`] when no reader claims the source,
    /// [`ReadError::AmbiguousFormat`] when several do.
    pub fn read_auto(&self, source: ReadSource<'_>, options: &ReadOptions) -> Result<Table> {
        let mut candidates = self.identify(&source.origin());
        match candidates.len() {
            0 => Err(ReadError::FormatNotIdentified {
                source_name: source.display_name(),
            }),
            1 => {
                let format = candidates.remove(0);
                debug!(format = %format, "identified format");
                self.read(&format, source, options)
            }
            _ => Err(ReadError::AmbiguousFormat {
                source_name: source.display_name(),
                candidates,
            }),
        }
    }

    fn unknown_format(&self, format: &str) -> ReadError {
        let registered: Vec<&str> = self.readers.keys().map(String::as_str).collect();
        ReadError::UnknownFormat {
            format: format.to_string(),
            registered: if registered.is_empty() {
                "none".to_string()
            } else {
                registered.join(", ")
            },
        }
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.readers.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn validate_format_name(format: &str) -> Result<()> {
    let reason = if format.is_empty() {
        "identifier is empty"
    } else if format.chars().any(char::is_whitespace) {
        "identifier contains whitespace"
    } else {
        return Ok(());
    };
    Err(ReadError::InvalidFormatName {
        format: format.to_string(),
        reason: reason.to_string(),
    })
}
