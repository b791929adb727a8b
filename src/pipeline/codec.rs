use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Terminator, WriterBuilder};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use crate::error::{SiftError, SiftResult};
use crate::pipeline::record::Record;

pub type GzipFileReader = MultiGzDecoder<BufReader<File>>;

/// Checks that `path` is a gzip stream whose first line carries a header.
///
/// Runs before a task is created so a bad upload never enters the registry.
/// Returns the header line without its terminator.
pub fn validate_archive(path: &Path) -> SiftResult<String> {
    let file = File::open(path)?;
    validate_header(MultiGzDecoder::new(BufReader::new(file)))
}

pub fn validate_header<R: Read>(reader: R) -> SiftResult<String> {
    let mut reader = BufReader::new(reader);
    let mut header = String::new();
    reader
        .read_line(&mut header)
        .map_err(|e| SiftError::CorruptInput(e.to_string()))?;

    if header.trim().is_empty() {
        return Err(SiftError::CorruptInput(
            "File appears to be empty or corrupted".to_string(),
        ));
    }

    Ok(header.trim_end_matches(['\r', '\n']).to_string())
}

/// Lazy, single-pass record stream over header-led CSV text.
pub struct RecordReader<R: Read> {
    headers: StringRecord,
    rows: StringRecordsIntoIter<R>,
}

impl RecordReader<GzipFileReader> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;
        Self::from_reader(MultiGzDecoder::new(BufReader::new(file)))
    }
}

impl<R: Read> RecordReader<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = csv_reader
            .headers()
            .context("Failed to read CSV header")?
            .clone();

        Ok(Self {
            headers,
            rows: csv_reader.into_records(),
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| {
            row.map(|row| Record::from_row(&self.headers, &row))
                .context("Failed to parse CSV row")
        })
    }
}

/// Columns from `column_order` that the first record actually carries.
pub fn available_columns<'a>(first: &Record, column_order: &[&'a str]) -> Vec<&'a str> {
    column_order
        .iter()
        .copied()
        .filter(|column| first.contains(column))
        .collect()
}

/// Writes a header row and one line per record. Empty input writes nothing.
pub fn encode<W: Write>(records: &[Record], column_order: &[&str], writer: W) -> Result<usize> {
    let Some(first) = records.first() else {
        return Ok(0);
    };
    let columns = available_columns(first, column_order);

    let mut csv_writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(writer);
    csv_writer.write_record(&columns)?;
    for record in records {
        csv_writer.write_record(columns.iter().map(|column| record.get(column)))?;
    }
    csv_writer.flush()?;

    Ok(records.len())
}

/// Encodes `records` into a new file at `path`. Returns `false` without
/// touching the filesystem when there is nothing to write.
pub fn write_records(records: &[Record], column_order: &[&str], path: &Path) -> Result<bool> {
    if records.is_empty() {
        return Ok(false);
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    encode(records, column_order, std::io::BufWriter::new(file))?;
    Ok(true)
}
