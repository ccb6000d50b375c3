//! CSV import and export of records.
//!
//! Export writes every column in table order with a header row. Import
//! reads any CSV that has a `title` column; see [`import::parse_import`]
//! for the row rules.

pub mod export;
pub mod import;

pub use export::{export_file_name, gzip_bytes, records_to_csv, write_csv};
pub use import::{CsvPreview, ParsedImport, import_csv, parse_import, preview_csv};

use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Export columns, in table order.
pub const CSV_COLUMNS: [&str; 6] = ["id", "name", "title", "category", "created_at", "notes"];

/// Rows shown by a preview unless configured otherwise.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV file is empty")]
    Empty,

    #[error("CSV has no 'title' column (found: {found})")]
    MissingTitleColumn { found: String },

    #[error("line {line}: expected {expected} fields, found {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read a CSV file into memory, decompressing it if it is gzip.
pub fn read_csv_file(path: &Path) -> Result<Vec<u8>, CsvError> {
    let bytes = std::fs::read(path)?;

    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = Vec::new();
        flate2::read::GzDecoder::new(bytes.as_slice()).read_to_end(&mut decoded)?;
        Ok(decoded)
    } else {
        Ok(bytes)
    }
}
