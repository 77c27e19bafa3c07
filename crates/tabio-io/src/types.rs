//! Mapping between polars dtypes and table column types.
//!
//! | polars                      | table      |
//! |-----------------------------|------------|
//! | any integer width           | `Int`      |
//! | `Float32`, `Float64`        | `Float`    |
//! | `Boolean`                   | `Bool`     |
//! | `String`                    | `Text`     |
//! | `Date`                      | `Date`     |
//! | `Datetime(unit, zone)`      | `Datetime` |
//! | `Time`                      | `Time`     |
//! | `Null`                      | `Text`     |
//!
//! Integers are widened to `i64`; a value outside the `i64` range is a
//! [`ReadError::TypeOverflow`]. Temporal columns keep the engine's physical
//! values, unit and timezone name unchanged.

use polars::prelude::{DataType, Series, TimeUnit as PolarsTimeUnit, TimeZone};
use tabio_model::{Column, ColumnData, ColumnType, TimeUnit};

use crate::error::{ReadError, Result};
use crate::nulls::reconcile;

/// Table type for a polars dtype.
///
/// # Errors
///
/// [`ReadError::UnsupportedColumnType`] naming `column` for dtypes without a
/// table equivalent (lists, structs, categoricals, binary data, ...).
pub fn map_dtype(column: &str, dtype: &DataType) -> Result<ColumnType> {
    let column_type = match dtype {
        dt if dt.is_integer() => ColumnType::Int,
        DataType::Float32 | DataType::Float64 => ColumnType::Float,
        DataType::Boolean => ColumnType::Bool,
        DataType::String | DataType::Null => ColumnType::Text,
        DataType::Date => ColumnType::Date,
        DataType::Datetime(unit, zone) => ColumnType::Datetime {
            unit: from_polars_unit(*unit),
            timezone: zone.as_ref().map(|tz| tz.as_str().to_string()),
        },
        DataType::Time => ColumnType::Time,
        other => {
            return Err(ReadError::UnsupportedColumnType {
                column: column.to_string(),
                dtype: other.to_string(),
            });
        }
    };
    Ok(column_type)
}

/// Polars dtype requested for a column type override.
///
/// # Errors
///
/// [`ReadError::InvalidOptionValue`] if the timezone is rejected by polars.
pub fn polars_dtype(column: &str, column_type: &ColumnType) -> Result<DataType> {
    let dtype = match column_type {
        ColumnType::Int => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Bool => DataType::Boolean,
        ColumnType::Text => DataType::String,
        ColumnType::Date => DataType::Date,
        ColumnType::Datetime { unit, timezone } => {
            let zone = TimeZone::opt_try_new(timezone.clone()).map_err(|e| {
                ReadError::invalid_value(
                    format!("dtypes.{column}"),
                    column_type.to_string(),
                    e.to_string(),
                )
            })?;
            DataType::Datetime(to_polars_unit(*unit), zone)
        }
        ColumnType::Time => DataType::Time,
    };
    Ok(dtype)
}

/// Converts one engine column into a table column.
///
/// Masked rows hold the type's default value.
pub fn convert_series(name: &str, series: &Series) -> Result<Column> {
    let column_type = map_dtype(name, series.dtype())?;
    let mask = reconcile(series);
    let data = match column_type {
        ColumnType::Int => ColumnData::Int(int_values(name, series)?),
        ColumnType::Float => {
            let widened = series.cast(&DataType::Float64)?;
            ColumnData::Float(
                widened
                    .f64()?
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
            )
        }
        ColumnType::Bool => ColumnData::Bool(
            series
                .bool()?
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect(),
        ),
        ColumnType::Text if series.dtype() == &DataType::Null => {
            ColumnData::Text(vec![String::new(); series.len()])
        }
        ColumnType::Text => ColumnData::Text(
            series
                .str()?
                .into_iter()
                .map(|v| v.unwrap_or_default().to_string())
                .collect(),
        ),
        ColumnType::Date => {
            let physical = series.to_physical_repr();
            ColumnData::Date(
                physical
                    .i32()?
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
            )
        }
        ColumnType::Datetime { unit, timezone } => {
            let physical = series.to_physical_repr();
            ColumnData::Datetime {
                values: physical
                    .i64()?
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
                unit,
                timezone,
            }
        }
        ColumnType::Time => {
            let physical = series.to_physical_repr();
            ColumnData::Time(
                physical
                    .i64()?
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
            )
        }
    };
    Ok(Column::new(name, data, mask))
}

/// Widens any integer column to `i64`.
///
/// A non-strict cast turns out-of-range values into nulls; a row that is
/// null after the cast but not before it is an overflow.
fn int_values(name: &str, series: &Series) -> Result<Vec<i64>> {
    let widened = series.cast(&DataType::Int64)?;
    if widened.null_count() != series.null_count() {
        let before = series.is_null();
        let after = widened.is_null();
        let overflow = (0..series.len())
            .find(|&row| after.get(row) == Some(true) && before.get(row) == Some(false));
        if let Some(row) = overflow {
            let value = series
                .get(row)
                .map(|v| v.to_string())
                .unwrap_or_default();
            return Err(ReadError::TypeOverflow {
                column: name.to_string(),
                row,
                value,
            });
        }
    }
    Ok(widened
        .i64()?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

fn from_polars_unit(unit: PolarsTimeUnit) -> TimeUnit {
    match unit {
        PolarsTimeUnit::Milliseconds => TimeUnit::Milliseconds,
        PolarsTimeUnit::Microseconds => TimeUnit::Microseconds,
        PolarsTimeUnit::Nanoseconds => TimeUnit::Nanoseconds,
    }
}

fn to_polars_unit(unit: TimeUnit) -> PolarsTimeUnit {
    match unit {
        TimeUnit::Milliseconds => PolarsTimeUnit::Milliseconds,
        TimeUnit::Microseconds => PolarsTimeUnit::Microseconds,
        TimeUnit::Nanoseconds => PolarsTimeUnit::Nanoseconds,
    }
}
