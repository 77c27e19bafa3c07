//! CSV reading through the polars engine.

mod layout;
mod reader;

pub use reader::{POLARS_CSV_FORMAT, PolarsCsvReader, WIDE_TABLE_COLUMNS};
