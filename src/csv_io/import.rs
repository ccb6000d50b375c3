//! CSV import: preview and parse uploaded files into new records.

use super::CsvError;
use crate::db::Database;
use crate::db::import::ImportReport;
use crate::error::{RecordError, RecordResult};
use crate::types::{Category, NewRecord};
use serde::Serialize;
use std::io::Read;
use tracing::{info, warn};

/// Cell values treated as missing, matching what spreadsheet tools and
/// pandas write for empty cells.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(value: &str) -> bool {
    NA_VALUES.contains(&value.trim())
}

/// First rows of an uploaded CSV, shown before the user confirms.
#[derive(Debug, Clone, Serialize)]
pub struct CsvPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Data rows in the whole file.
    pub total_rows: usize,
    pub has_title: bool,
}

/// Records extracted from a CSV, ready to insert.
#[derive(Debug, Clone, Default)]
pub struct ParsedImport {
    pub records: Vec<NewRecord>,
    /// Rows without a usable title.
    pub skipped: usize,
    pub warnings: Vec<String>,
}

/// Positions of the columns import cares about.
struct Columns {
    title: usize,
    name: Option<usize>,
    category: Option<usize>,
    notes: Option<usize>,
    width: usize,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self, CsvError> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let title = find("title").ok_or_else(|| CsvError::MissingTitleColumn {
            found: headers.join(", "),
        })?;

        Ok(Self {
            title,
            name: find("name"),
            category: find("category"),
            notes: find("notes"),
            width: headers.len(),
        })
    }
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input)
}

/// Header names with surrounding whitespace and a UTF-8 BOM removed.
fn read_headers<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<String>, CsvError> {
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::Empty);
    }
    Ok(headers)
}

fn check_width(record: &csv::StringRecord, width: usize) -> Result<(), CsvError> {
    if record.len() > width {
        return Err(CsvError::TooManyFields {
            line: record.position().map(|p| p.line()).unwrap_or_default(),
            expected: width,
            found: record.len(),
        });
    }
    Ok(())
}

/// Parse the header and the first `limit` rows without touching the store.
pub fn preview_csv<R: Read>(input: R, limit: usize) -> Result<CsvPreview, CsvError> {
    let mut rdr = reader(input);
    let headers = read_headers(&mut rdr)?;
    let has_title = headers.iter().any(|h| h.eq_ignore_ascii_case("title"));

    let mut rows = Vec::new();
    let mut total_rows = 0;
    for result in rdr.records() {
        let record = result?;
        check_width(&record, headers.len())?;
        total_rows += 1;
        if rows.len() < limit {
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
    }

    Ok(CsvPreview {
        headers,
        rows,
        total_rows,
        has_title,
    })
}

/// Turn CSV rows into [`NewRecord`]s.
///
/// - the header must contain `title`; `name`, `category` and `notes` are
///   optional and any other column is ignored
/// - rows whose title is missing or blank are skipped
/// - a missing category becomes `other`; an unrecognised one also becomes
///   `other` and adds a warning
/// - missing name and notes become empty strings
pub fn parse_import<R: Read>(input: R) -> Result<ParsedImport, CsvError> {
    let mut rdr = reader(input);
    let headers = read_headers(&mut rdr)?;
    let columns = Columns::locate(&headers)?;

    let mut parsed = ParsedImport::default();
    for result in rdr.records() {
        let record = result?;
        check_width(&record, columns.width)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let cell = |idx: Option<usize>| -> Option<&str> {
            idx.and_then(|i| record.get(i)).filter(|v| !is_missing(v))
        };

        let Some(title) = cell(Some(columns.title)).map(str::trim).filter(|t| !t.is_empty())
        else {
            parsed.skipped += 1;
            continue;
        };

        let category = match cell(columns.category) {
            None => Category::Other,
            Some(raw) => Category::parse(raw).unwrap_or_else(|| {
                parsed.warnings.push(format!(
                    "line {}: unknown category '{}' imported as other",
                    line,
                    raw.trim()
                ));
                Category::Other
            }),
        };

        parsed.records.push(NewRecord {
            name: cell(columns.name).unwrap_or_default().to_string(),
            title: title.to_string(),
            category,
            notes: cell(columns.notes).unwrap_or_default().to_string(),
        });
    }

    Ok(parsed)
}

/// Parse a CSV and insert every usable row in one transaction.
///
/// Any parse or insert failure aborts the whole import with
/// `IMPORT_FAILED`; nothing is written in that case.
pub fn import_csv<R: Read>(db: &Database, input: R) -> RecordResult<ImportReport> {
    let parsed = parse_import(input).map_err(RecordError::import_failed)?;

    for warning in &parsed.warnings {
        warn!("{}", warning);
    }

    let imported = db
        .import_records(&parsed.records)
        .map_err(|e| RecordError::import_failed(RecordError::from(e)))?;

    info!(imported, skipped = parsed.skipped, "CSV import complete");

    Ok(ImportReport {
        imported,
        skipped: parsed.skipped,
        warnings: parsed.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_applies_row_rules() {
        let csv = "id,title,category,name,notes,created_at\n\
                   9,Gold medal,竞赛,Ann,,2020-01-01\n\
                   10,,honor,Bob,x,\n\
                   11,Library card,hobby,,NaN,\n\
                   12,Diploma,,Cy,done,\n";
        let parsed = parse_import(csv.as_bytes()).unwrap();

        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.skipped, 1);

        let gold = &parsed.records[0];
        assert_eq!(gold.title, "Gold medal");
        assert_eq!(gold.category, Category::Competition);
        assert_eq!(gold.name, "Ann");
        assert_eq!(gold.notes, "");

        let card = &parsed.records[1];
        assert_eq!(card.category, Category::Other);
        assert_eq!(card.notes, "");
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("hobby"));

        assert_eq!(parsed.records[2].category, Category::Other);
    }

    #[test]
    fn test_parse_requires_title_column() {
        let err = parse_import("name,notes\nAnn,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CsvError::MissingTitleColumn { .. }));
    }

    #[test]
    fn test_parse_strips_bom_and_accepts_short_rows() {
        let csv = "\u{feff}title,notes\nOnly title\n";
        let parsed = parse_import(csv.as_bytes()).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].notes, "");
    }

    #[test]
    fn test_parse_rejects_long_rows() {
        let err = parse_import("title\na,b\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CsvError::TooManyFields { expected: 1, found: 2, .. }));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(parse_import("".as_bytes()), Err(CsvError::Empty)));
    }

    #[test]
    fn test_preview_limits_rows() {
        let mut csv = String::from("title,category\n");
        for i in 0..8 {
            csv.push_str(&format!("Item {},honor\n", i));
        }
        let preview = preview_csv(csv.as_bytes(), 5).unwrap();
        assert_eq!(preview.headers, vec!["title", "category"]);
        assert_eq!(preview.rows.len(), 5);
        assert_eq!(preview.total_rows, 8);
        assert!(preview.has_title);
        assert_eq!(preview.rows[4][0], "Item 4");
    }

    #[test]
    fn test_import_csv_reports_counts() {
        let db = Database::open_in_memory().unwrap();
        let report = import_csv(&db, "title,notes\nA,one\n,two\nB,\n".as_bytes()).unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(db.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_import_csv_failure_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let err = import_csv(&db, "title\nA\nB,extra\n".as_bytes()).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ImportFailed);
        assert!(err.message.starts_with("Import failed:"));
        assert!(db.list_all().unwrap().is_empty());
    }
}
