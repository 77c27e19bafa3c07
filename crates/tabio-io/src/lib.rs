//! Format-dispatched table reading.
//!
//! A [`FormatRegistry`] maps format identifiers to [`TableReader`]s. The
//! built-in `polars.csv` reader parses delimited text with polars and turns
//! the resulting columns into a [`tabio_model::Table`], keeping each
//! column's type and its missing values.
//!
//! # Example
//!
//! ```
//! use tabio_io::{FormatRegistry, POLARS_CSV_FORMAT, ReadOptions, ReadSource};
//! use tabio_model::CellValue;
//!
//! let registry = FormatRegistry::with_default_readers();
//! let table = registry
//!     .read(
//!         POLARS_CSV_FORMAT,
//!         ReadSource::bytes("a,b\n1,2\n,4\n"),
//!         &ReadOptions::default(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(table.column_names(), vec!["a", "b"]);
//! assert_eq!(table.cell(1, "a"), Some(CellValue::Missing));
//! assert_eq!(table.cell(1, "b"), Some(CellValue::Int(4)));
//! ```

#![deny(unsafe_code)]

pub mod assemble;
pub mod csv;
mod error;
pub mod nulls;
mod options;
mod registry;
mod source;
pub mod types;

pub use csv::{POLARS_CSV_FORMAT, PolarsCsvReader};
pub use error::{ErrorKind, ReadError, Result, SourcePosition};
pub use options::{OPTION_KEYS, ReadOptions};
pub use registry::{FormatInfo, FormatRegistry, TableReader};
pub use source::{ReadSource, SourceOrigin};
