//! CSV export.

use super::{CSV_COLUMNS, CsvError};
use crate::types::Record;
use chrono::{DateTime, TimeZone};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;

/// Write records as CSV with a header row.
pub fn write_csv<W: Write>(records: &[Record], writer: W) -> Result<(), CsvError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_COLUMNS)?;

    for record in records {
        let id = record.id.to_string();
        wtr.write_record([
            id.as_str(),
            record.name.as_str(),
            record.title.as_str(),
            record.category.as_str(),
            record.created_at.as_str(),
            record.notes.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Render records as CSV bytes.
pub fn records_to_csv(records: &[Record]) -> Result<Vec<u8>, CsvError> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(buf)
}

/// Download name for an export: filtered views and full dumps are named
/// differently.
pub fn export_file_name<Tz: TimeZone>(filtered: bool, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = now.format("%Y%m%d_%H%M%S");
    if filtered {
        format!("personal_info_export_{}.csv", stamp)
    } else {
        format!("all_personal_info_{}.csv", stamp)
    }
}

pub fn gzip_bytes(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
