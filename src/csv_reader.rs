use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use csv::{ReaderBuilder, Terminator, Trim};
use tracing::debug;

use crate::coerce::parse_numeric_text;
use crate::data::Table;
use crate::error::ChartResult;
use crate::value::Value;

/// CSV dialect and cell handling.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub quote: u8,
    pub escape: Option<u8>,
    /// Record terminator; `None` accepts `\n`, `\r` and `\r\n`.
    pub terminator: Option<u8>,
    pub has_header: bool,
    /// Cell text read as `null` in addition to empty cells.
    pub null_text: Option<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: None,
            terminator: None,
            has_header: true,
            null_text: None,
        }
    }
}

/// Coerces one cell: null sentinel and empty text to `null`, numeric text
/// (thousands separators allowed) to a number, anything else to a string.
pub fn parse_cell(text: &str, null_text: Option<&str>) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() || Some(trimmed) == null_text {
        return Value::Null;
    }
    match parse_numeric_text(trimmed) {
        Some(n) => Value::Number(n),
        None => Value::String(trimmed.to_owned()),
    }
}

/// Read CSV data into a table
pub fn read_table<R: Read>(reader: R, options: &CsvOptions) -> ChartResult<Table> {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(options.delimiter)
        .quote(options.quote)
        .escape(options.escape)
        .has_headers(options.has_header)
        .flexible(true)
        .trim(Trim::All);
    if let Some(terminator) = options.terminator {
        builder.terminator(Terminator::Any(terminator));
    }
    let mut csv_reader = builder.from_reader(reader);

    let headers = if options.has_header {
        Some(
            csv_reader
                .headers()?
                .iter()
                .map(|h| h.to_string())
                .collect::<Vec<_>>(),
        )
    } else {
        None
    };

    let null_text = options.null_text.as_deref();
    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(record.iter().map(|cell| parse_cell(cell, null_text)).collect());
    }

    debug!(
        columns = headers.as_ref().map_or(0, Vec::len),
        rows = rows.len(),
        "read csv table"
    );
    Ok(Table::new(headers, rows))
}

pub fn read_str(text: &str, options: &CsvOptions) -> ChartResult<Table> {
    read_table(text.as_bytes(), options)
}

pub fn read_path<P: AsRef<Path>>(path: P, options: &CsvOptions) -> ChartResult<Table> {
    let file = File::open(path)?;
    read_table(file, options)
}

/// Read CSV data from stdin
pub fn read_stdin(options: &CsvOptions) -> ChartResult<Table> {
    read_table(io::stdin().lock(), options)
}
