//! CSV export shared by the statistics and ranking views.
//!
//! Every export is a header row followed by one row per entity, with every field quoted.

use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;

/// Row type that can be flattened into a fixed set of CSV columns.
pub trait CsvRecord {
    const HEADERS: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8")]
    Encoding,
}

pub fn write_csv<W, T>(writer: W, rows: &[T]) -> Result<(), ExportError>
where
    W: Write,
    T: CsvRecord,
{
    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(T::HEADERS)?;
    for row in rows {
        csv_writer.write_record(row.fields())?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string<T: CsvRecord>(rows: &[T]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, rows)?;
    String::from_utf8(buffer).map_err(|_| ExportError::Encoding)
}
