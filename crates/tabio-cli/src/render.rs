//! Rendering tables for the terminal and as JSON.

use chrono::{DateTime, NaiveTime};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table as TextTable};
use serde_json::{Number, Value, json};
use tabio_io::FormatInfo;
use tabio_model::{CellValue, ColumnType, Table, TimeUnit};

const MISSING: &str = "null";

pub fn apply_table_style(table: &mut TextTable) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn shown_rows(table: &Table, limit: Option<usize>) -> usize {
    limit.map_or(table.num_rows(), |limit| limit.min(table.num_rows()))
}

/// Terminal view of the first `limit` rows.
///
/// The header shows each column's name above its type.
pub fn text_table(table: &Table, limit: Option<usize>) -> TextTable {
    let mut text = TextTable::new();
    text.set_header(
        table
            .columns()
            .iter()
            .map(|c| format!("{}\n{}", c.name, c.column_type())),
    );
    apply_table_style(&mut text);

    for row in 0..shown_rows(table, limit) {
        text.add_row(table.columns().iter().map(|column| {
            let cell = column.get(row).unwrap_or(CellValue::Missing);
            let content = format_cell(cell, &column.column_type());
            match cell {
                CellValue::Int(_) | CellValue::Float(_) => {
                    Cell::new(content).set_alignment(CellAlignment::Right)
                }
                _ => Cell::new(content),
            }
        }));
    }
    text
}

/// One-line shape summary printed under the table view.
pub fn summary_line(table: &Table, limit: Option<usize>) -> String {
    let shown = shown_rows(table, limit);
    let (rows, columns) = table.shape();
    if shown < rows {
        format!("{rows} rows x {columns} columns ({shown} shown)")
    } else {
        format!("{rows} rows x {columns} columns")
    }
}

/// Column-oriented JSON: `{"columns": [{"name", "type", "values"}], "shape": [rows, columns]}`.
///
/// Missing cells are `null`; temporal values are ISO 8601 strings.
pub fn json_table(table: &Table, limit: Option<usize>) -> Value {
    let shown = shown_rows(table, limit);
    let columns: Vec<Value> = table
        .columns()
        .iter()
        .map(|column| {
            let column_type = column.column_type();
            let values: Vec<Value> = column
                .iter()
                .take(shown)
                .map(|cell| json_cell(cell, &column_type))
                .collect();
            json!({
                "name": column.name,
                "type": column_type.to_string(),
                "values": values,
            })
        })
        .collect();
    json!({
        "columns": columns,
        "shape": [table.num_rows(), table.num_columns()],
    })
}

/// Registered formats as a terminal table.
pub fn formats_table(formats: &[FormatInfo]) -> TextTable {
    let mut text = TextTable::new();
    text.set_header(vec!["Format", "Description"]);
    apply_table_style(&mut text);
    for format in formats {
        text.add_row(vec![format.name.clone(), format.description.clone()]);
    }
    text
}

pub fn format_cell(cell: CellValue<'_>, column_type: &ColumnType) -> String {
    match cell {
        CellValue::Missing => MISSING.to_string(),
        CellValue::Int(v) => v.to_string(),
        CellValue::Float(v) => format!("{v:?}"),
        CellValue::Bool(v) => v.to_string(),
        CellValue::Text(v) => v.to_string(),
        CellValue::Date(days) => format_date(days).unwrap_or_else(|| days.to_string()),
        CellValue::Datetime(ticks) => format_datetime(ticks, column_type)
            .unwrap_or_else(|| ticks.to_string()),
        CellValue::Time(nanos) => format_time(nanos).unwrap_or_else(|| nanos.to_string()),
    }
}

fn json_cell(cell: CellValue<'_>, column_type: &ColumnType) -> Value {
    match cell {
        CellValue::Missing => Value::Null,
        CellValue::Int(v) => Value::from(v),
        CellValue::Bool(v) => Value::from(v),
        CellValue::Text(v) => Value::from(v),
        // JSON has no NaN or infinity
        CellValue::Float(v) => {
            Number::from_f64(v).map_or_else(|| Value::from(format!("{v}")), Value::Number)
        }
        CellValue::Date(_) | CellValue::Datetime(_) | CellValue::Time(_) => {
            Value::from(format_cell(cell, column_type))
        }
    }
}

fn format_date(days: i32) -> Option<String> {
    let date = DateTime::from_timestamp(i64::from(days) * 86_400, 0)?.date_naive();
    Some(date.format("%Y-%m-%d").to_string())
}

/// Ticks are UTC instants when the column has a timezone.
fn format_datetime(ticks: i64, column_type: &ColumnType) -> Option<String> {
    let ColumnType::Datetime { unit, timezone } = column_type else {
        return None;
    };
    let instant = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(ticks)?,
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(ticks)?,
        TimeUnit::Nanoseconds => DateTime::from_timestamp_nanos(ticks),
    };
    let text = instant
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.f")
        .to_string();
    Some(if timezone.is_some() {
        format!("{text}Z")
    } else {
        text
    })
}

fn format_time(nanos: i64) -> Option<String> {
    let secs = u32::try_from(nanos.div_euclid(1_000_000_000)).ok()?;
    let frac = u32::try_from(nanos.rem_euclid(1_000_000_000)).ok()?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, frac)?;
    Some(time.format("%H:%M:%S%.f").to_string())
}
