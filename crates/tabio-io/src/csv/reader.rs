//! The `polars.csv` reader.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use polars::prelude::{
    CsvEncoding, CsvParseOptions, CsvReadOptions, DataFrame, DataType, NullValues, PlSmallStr,
    Schema, SerReader,
};
use tabio_model::{Column, ColumnData, ColumnType, Mask, Table};
use tracing::{debug, warn};

use super::layout::{self, Dialect, Layout};
use crate::assemble::assemble;
use crate::error::{ReadError, Result};
use crate::options::ReadOptions;
use crate::registry::TableReader;
use crate::source::{ReadSource, SourceOrigin};
use crate::types::{convert_series, polars_dtype};

/// Format identifier of [`PolarsCsvReader`].
pub const POLARS_CSV_FORMAT: &str = "polars.csv";

/// Tables wider than this are logged as a warning.
pub const WIDE_TABLE_COLUMNS: usize = 500;

/// Reads delimited text with the polars CSV engine.
///
/// Options are translated to polars parse options; those polars cannot
/// honor are rejected by [`TableReader::validate`] before any input is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolarsCsvReader;

impl PolarsCsvReader {
    pub fn new() -> Self {
        Self
    }
}

impl TableReader for PolarsCsvReader {
    fn description(&self) -> &str {
        "Delimited text parsed by the polars CSV engine"
    }

    fn identify(&self, origin: &SourceOrigin<'_>) -> bool {
        origin.extension().is_some_and(|ext| ext == "csv")
    }

    fn validate(&self, options: &ReadOptions) -> Result<()> {
        checked_dialect(options).map(|_| ())
    }

    fn read(&self, source: ReadSource<'_>, options: &ReadOptions) -> Result<Table> {
        let dialect = checked_dialect(options)?;
        let source_name = source.display_name();
        let bytes = source.into_bytes()?;

        let (body, skipped) = layout::skip_lines(layout::strip_bom(&bytes), options.skip_rows);
        let layout = layout::scan(body, &dialect, options.header, &options.null_values, skipped)?;
        debug!(
            source = %source_name,
            fields = layout.field_count,
            data_rows = layout.data_rows,
            skipped_lines = skipped.lines,
            "scanned csv layout"
        );
        if layout.field_count == 0 {
            return Ok(Table::empty());
        }

        let names = column_names(&layout, options)?;
        if names.len() > WIDE_TABLE_COLUMNS {
            warn!(
                source = %source_name,
                columns = names.len(),
                "table has more than {WIDE_TABLE_COLUMNS} columns"
            );
        }
        let overrides = column_overrides(&names, options)?;
        let selected = selected_columns(&names, options)?;

        let columns = if layout.data_rows == 0 {
            selected
                .iter()
                .map(|&idx| {
                    let column_type = overrides[idx].clone().unwrap_or(ColumnType::Text);
                    Column::new(
                        names[idx].clone(),
                        ColumnData::empty(&column_type),
                        Mask::all_valid(0),
                    )
                })
                .collect()
        } else {
            check_integer_range(&layout, &names, &overrides, &selected)?;
            let frame = parse_frame(
                &layout.data,
                &dialect,
                options,
                &names,
                &overrides,
                &selected,
            )?;
            convert_frame(&frame, &names, &selected, layout.data_rows)?
        };
        assemble(columns)
    }
}

/// Checks the options against each other and returns the dialect they give.
fn checked_dialect(options: &ReadOptions) -> Result<Dialect> {
    let dialect = dialect(options)?;

    if let Some(names) = &options.names {
        if let Some(name) = first_duplicate(names) {
            return Err(ReadError::conflicting(format!(
                "names lists '{name}' more than once"
            )));
        }
        for column in options.include_names.iter().flatten() {
            if !names.contains(column) {
                return Err(ReadError::conflicting(format!(
                    "include_names entry '{column}' is not among names"
                )));
            }
        }
    }
    if let Some(name) = options.include_names.as_deref().and_then(first_duplicate) {
        return Err(ReadError::conflicting(format!(
            "include_names lists '{name}' more than once"
        )));
    }
    Ok(dialect)
}

/// Translates the single-character options to bytes polars accepts.
fn dialect(options: &ReadOptions) -> Result<Dialect> {
    let delimiter = ascii_byte("delimiter", options.delimiter)?;
    if matches!(delimiter, b'\n' | b'\r') {
        return Err(ReadError::conflicting("delimiter cannot be a line terminator"));
    }
    let quote = options
        .quote_char
        .map(|quote| ascii_byte("quote_char", quote))
        .transpose()?;
    let comment = options
        .comment
        .map(|comment| ascii_byte("comment", comment))
        .transpose()?;
    if quote == Some(delimiter) {
        return Err(ReadError::conflicting("quote_char equals the delimiter"));
    }
    if comment == Some(delimiter) {
        return Err(ReadError::conflicting("comment equals the delimiter"));
    }

    let encoding = match options.encoding.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => CsvEncoding::Utf8,
        "utf-8-lossy" | "utf8-lossy" => CsvEncoding::LossyUtf8,
        other => {
            return Err(ReadError::unsupported_option(
                POLARS_CSV_FORMAT,
                "encoding",
                format!("polars decodes UTF-8 only, not '{other}'"),
            ));
        }
    };

    Ok(Dialect {
        delimiter,
        quote,
        comment,
        encoding,
    })
}

fn ascii_byte(option: &str, value: char) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            ReadError::unsupported_option(
                POLARS_CSV_FORMAT,
                option,
                format!("polars needs a single ASCII character, got '{value}'"),
            )
        })
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}

/// Final column names: `names`, else the header, else `col1..colN`.
fn column_names(layout: &Layout, options: &ReadOptions) -> Result<Vec<String>> {
    if let Some(names) = &options.names {
        if names.len() != layout.field_count {
            return Err(ReadError::conflicting(format!(
                "{} names given for {} fields",
                names.len(),
                layout.field_count
            )));
        }
        return Ok(names.clone());
    }
    match &layout.header {
        Some(header) => {
            if let Some(name) = first_duplicate(header) {
                return Err(ReadError::Parse {
                    message: format!("header repeats column name '{name}'"),
                    position: layout.header_position,
                });
            }
            Ok(header.clone())
        }
        None => Ok((1..=layout.field_count).map(|i| format!("col{i}")).collect()),
    }
}

/// Per-position type overrides.
fn column_overrides(names: &[String], options: &ReadOptions) -> Result<Vec<Option<ColumnType>>> {
    let mut overrides = vec![None; names.len()];
    for (column, column_type) in &options.dtypes {
        let idx = names
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| ReadError::unknown_column("dtypes", column))?;
        overrides[idx] = Some(column_type.clone());
    }
    Ok(overrides)
}

/// Positions of the output columns, in output order.
fn selected_columns(names: &[String], options: &ReadOptions) -> Result<Vec<usize>> {
    match &options.include_names {
        None => Ok((0..names.len()).collect()),
        Some(include) => include
            .iter()
            .map(|column| {
                names
                    .iter()
                    .position(|name| name == column)
                    .ok_or_else(|| ReadError::unknown_column("include_names", column))
            })
            .collect(),
    }
}

/// Name polars gives the `idx`-th column of header-less input.
fn engine_name(idx: usize) -> PlSmallStr {
    format!("column_{}", idx + 1).into()
}

/// Decimal integers the engine would read as `i64` must fit in it.
fn check_integer_range(
    layout: &Layout,
    names: &[String],
    overrides: &[Option<ColumnType>],
    selected: &[usize],
) -> Result<()> {
    for &idx in selected {
        let text = &layout.integers[idx];
        let Some((row, value)) = &text.overflow else {
            continue;
        };
        let read_as_int = match &overrides[idx] {
            Some(column_type) => *column_type == ColumnType::Int,
            None => !text.non_integer,
        };
        if read_as_int {
            return Err(ReadError::TypeOverflow {
                column: names[idx].clone(),
                row: *row,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Parses the re-encoded data records. Columns left out of the selection
/// are read as strings and dropped.
fn parse_frame(
    data: &[u8],
    dialect: &Dialect,
    options: &ReadOptions,
    names: &[String],
    overrides: &[Option<ColumnType>],
    selected: &[usize],
) -> Result<DataFrame> {
    let mut kept = vec![false; names.len()];
    for &idx in selected {
        kept[idx] = true;
    }
    let mut schema = Schema::default();
    for (idx, column_type) in overrides.iter().enumerate() {
        if !kept[idx] {
            schema.with_column(engine_name(idx), DataType::String);
        } else if let Some(column_type) = column_type {
            schema.with_column(engine_name(idx), polars_dtype(&names[idx], column_type)?);
        }
    }

    let sentinels: Vec<PlSmallStr> = options
        .null_values
        .iter()
        .filter(|value| !value.is_empty())
        .map(|value| PlSmallStr::from(value.as_str()))
        .collect();

    // Quoted and bare empty fields are both written bare by the scan.
    let parse_options = CsvParseOptions::default()
        .with_separator(dialect.delimiter)
        .with_quote_char(dialect.quote)
        .with_encoding(dialect.encoding)
        .with_missing_is_null(options.is_null_value(""))
        .with_null_values((!sentinels.is_empty()).then(|| NullValues::AllColumns(sentinels)))
        .with_try_parse_dates(options.parse_dates);

    let frame = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(None)
        .with_raise_if_empty(false)
        .with_schema_overwrite((!schema.is_empty()).then(|| Arc::new(schema)))
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(data.to_vec()))
        .finish()?;
    Ok(frame)
}

/// Converts the selected columns, checking the frame against the scan.
fn convert_frame(
    frame: &DataFrame,
    names: &[String],
    selected: &[usize],
    rows: usize,
) -> Result<Vec<Column>> {
    // One trailing column per record comes from the scan's padding field.
    if frame.width() != names.len() + 1 {
        return Err(ReadError::Structural {
            message: format!(
                "engine produced {} columns for {} fields",
                frame.width().saturating_sub(1),
                names.len()
            ),
            columns: names.to_vec(),
        });
    }
    if frame.height() != rows {
        return Err(ReadError::Structural {
            message: format!("engine produced {} rows for {rows} records", frame.height()),
            columns: selected.iter().map(|&idx| names[idx].clone()).collect(),
        });
    }
    let columns = frame.get_columns();
    selected
        .iter()
        .map(|&idx| convert_series(&names[idx], columns[idx].as_materialized_series()))
        .collect()
}

#[cfg(test)]
mod tests {
    use tabio_model::CellValue;

    use super::*;

    fn read(input: &str, options: &ReadOptions) -> Result<Table> {
        PolarsCsvReader::new().read(ReadSource::bytes(input), options)
    }

    #[test]
    fn test_identify_by_extension() {
        let reader = PolarsCsvReader::new();
        let path = std::path::Path::new("data/Report.CSV");
        assert!(reader.identify(&SourceOrigin { path: Some(path) }));
        assert!(!reader.identify(&SourceOrigin { path: None }));
    }

    #[test]
    fn test_validate_rejects_non_ascii_delimiter() {
        let options = ReadOptions::default().with_delimiter('§');
        let err = PolarsCsvReader::new().validate(&options).unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnsupportedOption { ref option, .. } if option == "delimiter"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_encoding() {
        let options = ReadOptions::default().with_encoding("latin-1");
        assert!(matches!(
            PolarsCsvReader::new().validate(&options),
            Err(ReadError::UnsupportedOption { .. })
        ));
    }

    #[test]
    fn test_validate_conflicts() {
        let reader = PolarsCsvReader::new();
        let cases = [
            ReadOptions::default().with_delimiter('\n'),
            ReadOptions::default().with_quote_char(Some(',')),
            ReadOptions::default().with_delimiter(';').with_comment(Some(';')),
            ReadOptions::default().with_names(["a", "a"]),
            ReadOptions::default()
                .with_names(["a", "b"])
                .with_include_names(["c"]),
        ];
        for options in cases {
            assert!(
                matches!(reader.validate(&options), Err(ReadError::ConflictingOptions { .. })),
                "{options:?}"
            );
        }
    }

    #[test]
    fn test_header_less_names() {
        let table = read("1,x\n2,y\n", &ReadOptions::default().with_header(false)).unwrap();
        assert_eq!(table.column_names(), vec!["col1", "col2"]);
        assert_eq!(table.cell(1, "col2"), Some(CellValue::Text("y")));
    }

    #[test]
    fn test_names_replace_header() {
        let options = ReadOptions::default().with_names(["x", "y"]);
        let table = read("a,b\n1,2\n", &options).unwrap();
        assert_eq!(table.column_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_names_length_must_match() {
        let options = ReadOptions::default().with_names(["x"]);
        assert!(matches!(
            read("a,b\n1,2\n", &options),
            Err(ReadError::ConflictingOptions { .. })
        ));
    }

    #[test]
    fn test_dtype_override() {
        let options = ReadOptions::default().with_dtype("a", ColumnType::Float);
        let table = read("a,b\n1,2\n3,4\n", &options).unwrap();
        assert_eq!(table.column("a").unwrap().column_type(), ColumnType::Float);
        assert_eq!(table.column("b").unwrap().column_type(), ColumnType::Int);
        assert_eq!(table.cell(1, "a"), Some(CellValue::Float(3.0)));
    }

    #[test]
    fn test_dtype_for_unknown_column() {
        let options = ReadOptions::default().with_dtype("zzz", ColumnType::Int);
        let err = read("a,b\n1,2\n", &options).unwrap_err();
        assert!(matches!(
            err,
            ReadError::UnknownColumn { ref option, ref column } if option == "dtypes" && column == "zzz"
        ));
    }

    #[test]
    fn test_include_names_projects_in_order() {
        let options = ReadOptions::default().with_include_names(["c", "a"]);
        let table = read("a,b,c\n1,2,3\n", &options).unwrap();
        assert_eq!(table.column_names(), vec!["c", "a"]);
        assert_eq!(table.cell(0, "c"), Some(CellValue::Int(3)));
    }

    #[test]
    fn test_custom_sentinels() {
        let options = ReadOptions::default().with_null_values(["NA", ""]);
        let table = read("a,b\nNA,x\n2,\n", &options).unwrap();
        assert_eq!(table.column("a").unwrap().column_type(), ColumnType::Int);
        assert!(table.cell(0, "a").unwrap().is_missing());
        assert!(table.cell(1, "b").unwrap().is_missing());
    }

    #[test]
    fn test_skip_rows_and_bom() {
        let options = ReadOptions::default()
            .with_skip_rows(1)
            .with_delimiter(';');
        let table = read("\u{feff}generated by tool\na;b\n1;2\n", &options).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.num_rows(), 1);
    }

    #[test]
    fn test_header_only_gives_zero_rows() {
        let options = ReadOptions::default().with_dtype("b", ColumnType::Int);
        let table = read("a,b\n", &options).unwrap();
        assert_eq!(table.shape(), (0, 2));
        assert_eq!(table.column("a").unwrap().column_type(), ColumnType::Text);
        assert_eq!(table.column("b").unwrap().column_type(), ColumnType::Int);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(read("", &ReadOptions::default()).unwrap().shape(), (0, 0));
    }

    #[test]
    fn test_duplicate_header_is_parse_error() {
        let err = read("x\na,a\n1,2\n", &ReadOptions::default().with_skip_rows(1)).unwrap_err();
        match err {
            ReadError::Parse { message, position } => {
                assert!(message.contains("'a'"), "{message}");
                let position = position.unwrap();
                assert_eq!((position.line, position.byte, position.record), (2, 2, 0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_names_replace_duplicate_header() {
        let options = ReadOptions::default().with_names(["x", "y"]);
        let table = read("a,a\n1,2\n", &options).unwrap();
        assert_eq!(table.column_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let table = read("a,b\n1,2\n\n3,4\n\n", &ReadOptions::default()).unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.column("a").unwrap().missing_count(), 0);
        assert_eq!(table.cell(1, "b"), Some(CellValue::Int(4)));

        let table = read("a\ntrue\nfalse\n\n", &ReadOptions::default()).unwrap();
        assert_eq!(table.shape(), (2, 1));
        assert_eq!(table.column("a").unwrap().column_type(), ColumnType::Bool);
        assert_eq!(table.column("a").unwrap().missing_count(), 0);
    }

    #[test]
    fn test_lone_carriage_returns() {
        let table = read("a\r1\r2\r", &ReadOptions::default()).unwrap();
        assert_eq!(table.shape(), (2, 1));
        assert_eq!(table.cell(0, "a"), Some(CellValue::Int(1)));
        assert_eq!(table.cell(1, "a"), Some(CellValue::Int(2)));
    }

    #[test]
    fn test_quoted_empty_is_missing() {
        let table = read("a\n1\n\"\"\n3\n", &ReadOptions::default()).unwrap();
        let a = table.column("a").unwrap();
        assert_eq!(a.column_type(), ColumnType::Int);
        assert_eq!(a.get(1), Some(CellValue::Missing));
        assert_eq!(a.get(2), Some(CellValue::Int(3)));
    }

    #[test]
    fn test_quoted_empty_is_text_without_empty_sentinel() {
        let options = ReadOptions::default().with_null_values(["NA"]);
        let table = read("a\nx\n\"\"\nNA\n", &options).unwrap();
        assert_eq!(table.cell(1, "a"), Some(CellValue::Text("")));
        assert_eq!(table.cell(2, "a"), Some(CellValue::Missing));
    }

    #[test]
    fn test_integer_overflow_names_column_and_row() {
        let err = read("id,n\n1,5\n2,-9223372036854775809\n", &ReadOptions::default())
            .unwrap_err();
        match err {
            ReadError::TypeOverflow { column, row, value } => {
                assert_eq!(column, "n");
                assert_eq!(row, 1);
                assert_eq!(value, "-9223372036854775809");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_large_integers_in_text_columns_are_kept() {
        let table = read("n\n9223372036854775808\nabc\n", &ReadOptions::default()).unwrap();
        assert_eq!(
            table.cell(0, "n"),
            Some(CellValue::Text("9223372036854775808"))
        );

        let options = ReadOptions::default().with_dtype("n", ColumnType::Text);
        let table = read("n\n9223372036854775808\n", &options).unwrap();
        assert_eq!(table.column("n").unwrap().column_type(), ColumnType::Text);
    }

    #[test]
    fn test_dropped_columns_are_not_typed() {
        let options = ReadOptions::default().with_include_names(["a"]);
        let table = read("a,big\n1,9223372036854775808\n", &options).unwrap();
        assert_eq!(table.shape(), (1, 1));
        assert_eq!(table.cell(0, "a"), Some(CellValue::Int(1)));
    }

    #[test]
    fn test_tab_delimited_with_comments() {
        let options = ReadOptions::default()
            .with_delimiter('\t')
            .with_comment(Some('#'));
        let table = read("a\tb\n# skipped\n1\t2\n", &options).unwrap();
        assert_eq!(table.shape(), (1, 2));
    }
}
