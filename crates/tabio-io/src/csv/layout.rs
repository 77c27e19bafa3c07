//! Record layout of a CSV input, discovered before polars parses it.
//!
//! Polars pads short rows with nulls and reads blank lines as records, so
//! records are walked here with the `csv` crate using the same dialect. The
//! scan yields the header and the data records re-encoded for polars: one
//! `\n`-terminated line per accepted record, with no comments or blank lines.

use polars::prelude::CsvEncoding;

use crate::error::{ReadError, Result, SourcePosition};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Single-byte dialect shared by the scan and the polars parse.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dialect {
    pub delimiter: u8,
    pub quote: Option<u8>,
    pub comment: Option<u8>,
    pub encoding: CsvEncoding,
}

/// What was dropped ahead of the scanned body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Skipped {
    pub lines: usize,
    pub bytes: usize,
}

/// Decimal integer text seen in one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct IntegerText {
    /// A present field that is not a decimal integer was seen.
    pub non_integer: bool,
    /// First decimal integer outside the `i64` range, with its data row.
    pub overflow: Option<(usize, String)>,
}

impl IntegerText {
    fn observe(&mut self, row: usize, field: &[u8]) {
        if self.non_integer {
            return;
        }
        let digits = field.strip_prefix(b"-").unwrap_or(field);
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            self.non_integer = true;
            return;
        }
        if self.overflow.is_none() {
            let text = String::from_utf8_lossy(field);
            if text.parse::<i64>().is_err() {
                self.overflow = Some((row, text.into_owned()));
            }
        }
    }
}

/// Shape of the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Layout {
    /// Header names, when the input has a header record.
    pub header: Option<Vec<String>>,
    /// Where the header record starts.
    pub header_position: Option<SourcePosition>,
    /// Fields per record; zero for empty input.
    pub field_count: usize,
    /// Records after the header.
    pub data_rows: usize,
    /// Data records, each followed by one extra empty field so that a record
    /// holding a single empty field is never a blank line.
    pub data: Vec<u8>,
    /// Per-column integer text, skipping empty and null-sentinel fields.
    pub integers: Vec<IntegerText>,
}

pub(crate) fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Drops up to `lines` physical lines ended by `\n`, `\r\n` or `\r`.
pub(crate) fn skip_lines(bytes: &[u8], lines: usize) -> (&[u8], Skipped) {
    let mut skipped = Skipped::default();
    while skipped.lines < lines && skipped.bytes < bytes.len() {
        let rest = &bytes[skipped.bytes..];
        skipped.bytes += match rest.iter().position(|&b| matches!(b, b'\n' | b'\r')) {
            Some(pos) if rest[pos..].starts_with(b"\r\n") => pos + 2,
            Some(pos) => pos + 1,
            None => rest.len(),
        };
        skipped.lines += 1;
    }
    (&bytes[skipped.bytes..], skipped)
}

/// Walks every record, checking that all have the same field count.
pub(crate) fn scan(
    body: &[u8],
    dialect: &Dialect,
    has_header: bool,
    null_values: &[String],
    skipped: Skipped,
) -> Result<Layout> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .delimiter(dialect.delimiter)
        .quote(dialect.quote.unwrap_or(b'"'))
        .quoting(dialect.quote.is_some())
        .comment(dialect.comment)
        .from_reader(body);
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(dialect.delimiter)
        .quote(dialect.quote.unwrap_or(b'"'))
        .quote_style(if dialect.quote.is_some() {
            ::csv::QuoteStyle::Necessary
        } else {
            ::csv::QuoteStyle::Never
        })
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut layout = Layout::default();
    let mut record = ::csv::ByteRecord::new();
    let mut first = true;
    loop {
        match reader.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => return Err(parse_error(&err, skipped)),
        }
        if first {
            first = false;
            layout.field_count = record.len();
            layout.integers = vec![IntegerText::default(); record.len()];
            if has_header {
                layout.header = Some(
                    record
                        .iter()
                        .map(|field| String::from_utf8_lossy(field).into_owned())
                        .collect(),
                );
                layout.header_position = record.position().map(|pos| shifted(pos, skipped));
                continue;
            }
        }

        let row = layout.data_rows;
        for (column, field) in layout.integers.iter_mut().zip(record.iter()) {
            if !field.is_empty() && !null_values.iter().any(|v| v.as_bytes() == field) {
                column.observe(row, field);
            }
        }
        writer
            .write_record(record.iter().chain(std::iter::once(&b""[..])))
            .map_err(|err| ReadError::parse(err.to_string()))?;
        layout.data_rows += 1;
    }
    layout.data = writer
        .into_inner()
        .map_err(|err| ReadError::parse(err.to_string()))?;
    Ok(layout)
}

fn shifted(pos: &::csv::Position, skipped: Skipped) -> SourcePosition {
    SourcePosition {
        line: pos.line() + skipped.lines as u64,
        byte: pos.byte() + skipped.bytes as u64,
        record: pos.record(),
    }
}

fn parse_error(err: &::csv::Error, skipped: Skipped) -> ReadError {
    let position = err.position().map(|pos| shifted(pos, skipped));
    let message = match err.kind() {
        ::csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    };
    ReadError::Parse { message, position }
}
