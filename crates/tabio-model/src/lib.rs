//! In-memory table model.
//!
//! A [`Table`] is an ordered list of named [`Column`]s. Every column stores
//! its values in a typed buffer ([`ColumnData`]) next to a [`Mask`] that
//! flags missing entries, one flag per row.
//!
//! # Example
//!
//! ```
//! use tabio_model::{CellValue, Column, ColumnData, Mask, Table};
//!
//! let table = Table::from_columns(vec![
//!     Column::new("a", ColumnData::Int(vec![1, 0]), Mask::from_missing(vec![false, true])),
//!     Column::valid("b", ColumnData::Int(vec![2, 4])),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.num_rows(), 2);
//! assert_eq!(table.cell(1, "a"), Some(CellValue::Missing));
//! ```

#![deny(unsafe_code)]

mod column;
mod error;
mod mask;
mod table;
mod types;

pub use column::{CellValue, Column, ColumnData};
pub use error::{Result, TableError};
pub use mask::Mask;
pub use table::Table;
pub use types::{ColumnType, ParseColumnTypeError, TimeUnit};
