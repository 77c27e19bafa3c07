//! Typed column buffers.

use serde::{Deserialize, Serialize};

use crate::mask::Mask;
use crate::types::{ColumnType, TimeUnit};

/// Values of one column, stored contiguously by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
    Text(Vec<String>),
    /// Days since 1970-01-01.
    Date(Vec<i32>),
    /// Ticks since 1970-01-01T00:00:00 in `unit`; `timezone` is kept verbatim.
    Datetime {
        values: Vec<i64>,
        unit: TimeUnit,
        timezone: Option<String>,
    },
    /// Nanoseconds since midnight.
    Time(Vec<i64>),
}

impl ColumnData {
    /// An empty buffer of the given type.
    #[must_use]
    pub fn empty(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::Int => Self::Int(Vec::new()),
            ColumnType::Float => Self::Float(Vec::new()),
            ColumnType::Bool => Self::Bool(Vec::new()),
            ColumnType::Text => Self::Text(Vec::new()),
            ColumnType::Date => Self::Date(Vec::new()),
            ColumnType::Datetime { unit, timezone } => Self::Datetime {
                values: Vec::new(),
                unit: *unit,
                timezone: timezone.clone(),
            },
            ColumnType::Time => Self::Time(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Date(v) => v.len(),
            Self::Datetime { values, .. } => values.len(),
            Self::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Int(_) => ColumnType::Int,
            Self::Float(_) => ColumnType::Float,
            Self::Bool(_) => ColumnType::Bool,
            Self::Text(_) => ColumnType::Text,
            Self::Date(_) => ColumnType::Date,
            Self::Datetime { unit, timezone, .. } => ColumnType::Datetime {
                unit: *unit,
                timezone: timezone.clone(),
            },
            Self::Time(_) => ColumnType::Time,
        }
    }

    /// Raw value at `row`, ignoring any mask.
    fn raw(&self, row: usize) -> Option<CellValue<'_>> {
        match self {
            Self::Int(v) => v.get(row).copied().map(CellValue::Int),
            Self::Float(v) => v.get(row).copied().map(CellValue::Float),
            Self::Bool(v) => v.get(row).copied().map(CellValue::Bool),
            Self::Text(v) => v.get(row).map(|s| CellValue::Text(s)),
            Self::Date(v) => v.get(row).copied().map(CellValue::Date),
            Self::Datetime { values, .. } => values.get(row).copied().map(CellValue::Datetime),
            Self::Time(v) => v.get(row).copied().map(CellValue::Time),
        }
    }
}

/// A single cell, borrowed from its column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(&'a str),
    Date(i32),
    Datetime(i64),
    Time(i64),
    Missing,
}

impl CellValue<'_> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// A named column: values plus missing-value mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
    pub mask: Mask,
}

impl Column {
    /// Creates a column. Lengths are checked when the column joins a table.
    pub fn new(name: impl Into<String>, data: ColumnData, mask: Mask) -> Self {
        Self {
            name: name.into(),
            data,
            mask,
        }
    }

    /// Creates a column with no missing values.
    pub fn valid(name: impl Into<String>, data: ColumnData) -> Self {
        let mask = Mask::all_valid(data.len());
        Self::new(name, data, mask)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    /// Cell at `row`, `Missing` where masked. `None` past the end.
    pub fn get(&self, row: usize) -> Option<CellValue<'_>> {
        let value = self.data.raw(row)?;
        if self.mask.is_missing(row) {
            Some(CellValue::Missing)
        } else {
            Some(value)
        }
    }

    /// Iterates cells in row order.
    pub fn iter(&self) -> impl Iterator<Item = CellValue<'_>> + '_ {
        (0..self.len()).filter_map(move |row| self.get(row))
    }

    pub fn missing_count(&self) -> usize {
        self.mask.missing_count()
    }
}

// Placeholders under the mask are not data, so compare cell views.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.column_type() == other.column_type()
            && self.len() == other.len()
            && self.iter().eq(other.iter())
    }
}
