//! Record CRUD operations.

use super::{Database, RECORD_COLUMNS, parse_record_row};
use crate::error::{ErrorCode, RecordError};
use crate::types::{Category, Field, NewRecord, Record};
use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::{debug, info};

/// Timestamp format SQLite's `datetime()` produces.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Insert a record on an open connection and return its id.
///
/// Shared by single inserts and the CSV import transaction.
pub(crate) fn insert_record_conn(conn: &Connection, record: &NewRecord) -> Result<i64> {
    let title = record.title.trim();
    if title.is_empty() {
        return Err(RecordError::missing_field("title").into());
    }

    conn.execute(
        "INSERT INTO records (name, title, category, created_at, notes)
         VALUES (?1, ?2, ?3, datetime('now'), ?4)",
        params![
            record.name.trim(),
            title,
            record.category.as_str(),
            record.notes
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

fn get_record_conn(conn: &Connection, id: i64) -> Result<Option<Record>> {
    let sql = format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS);
    let record = conn
        .query_row(&sql, params![id], parse_record_row)
        .optional()?;
    Ok(record)
}

/// Validate and normalize a new value for an updatable field.
fn normalize_update_value(field: Field, value: &str) -> Result<String> {
    match field {
        Field::Id => Err(RecordError::invalid_value("id", "Record id cannot be changed").into()),
        Field::Title => {
            let title = value.trim();
            if title.is_empty() {
                Err(RecordError::missing_field("title").into())
            } else {
                Ok(title.to_string())
            }
        }
        Field::Category => Category::parse(value)
            .map(|c| c.as_str().to_string())
            .ok_or_else(|| {
                RecordError::invalid_value("category", format!("Unknown category '{}'", value))
                    .into()
            }),
        Field::CreatedAt => {
            let value = value.trim();
            if let Ok(ts) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
                Ok(ts.format(TIMESTAMP_FORMAT).to_string())
            } else if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                Ok(format!("{} 00:00:00", date.format("%Y-%m-%d")))
            } else {
                Err(RecordError::invalid_value(
                    "created_at",
                    format!(
                        "Invalid timestamp '{}': expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS",
                        value
                    ),
                )
                .into())
            }
        }
        Field::Name => Ok(value.trim().to_string()),
        Field::Notes => Ok(value.to_string()),
    }
}

impl Database {
    /// Insert a new record. The title must not be blank.
    pub fn insert_record(&self, record: NewRecord) -> Result<Record> {
        self.with_conn(|conn| {
            let id = insert_record_conn(conn, &record)?;
            info!(id, title = %record.title.trim(), category = %record.category, "Record added");
            get_record_conn(conn, id)?.ok_or_else(|| anyhow!("inserted record {} vanished", id))
        })
    }

    /// Get a record by id.
    pub fn get_record(&self, id: i64) -> Result<Option<Record>> {
        self.with_conn(|conn| get_record_conn(conn, id))
    }

    /// List every record ordered by id.
    pub fn list_all(&self) -> Result<Vec<Record>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM records ORDER BY id ASC", RECORD_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map([], parse_record_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    /// All record ids, ascending.
    pub fn list_ids(&self) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM records ORDER BY id ASC")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<i64>>>()?;
            Ok(ids)
        })
    }

    /// Update a single field of a record and return the updated record.
    pub fn update_field(&self, id: i64, field: Field, value: &str) -> Result<Record> {
        let value = normalize_update_value(field, value)?;

        self.with_conn(|conn| {
            // Column name comes from the closed Field enum.
            let sql = format!("UPDATE records SET {} = ?1 WHERE id = ?2", field.column());
            let changed = conn.execute(&sql, params![value, id])?;
            if changed == 0 {
                return Err(RecordError::not_found(id).into());
            }
            info!(id, field = %field, "Record updated");
            get_record_conn(conn, id)?.ok_or_else(|| RecordError::not_found(id).into())
        })
    }

    /// Delete one record.
    pub fn delete_record(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
            if changed == 0 {
                return Err(RecordError::not_found(id).into());
            }
            info!(id, "Record deleted");
            Ok(())
        })
    }

    /// Delete several records at once. Returns the number of rows removed;
    /// ids that do not exist are ignored.
    pub fn delete_records(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Err(RecordError::new(
                ErrorCode::MissingRequiredField,
                "Select at least one record to delete",
            )
            .with_field("ids")
            .into());
        }

        self.with_conn(|conn| {
            let placeholders = vec!["?"; ids.len()].join(",");
            let sql = format!("DELETE FROM records WHERE id IN ({})", placeholders);
            let removed = conn.execute(&sql, params_from_iter(ids.iter()))?;
            debug!(requested = ids.len(), removed, "Batch delete");
            info!(removed, "Records deleted");
            Ok(removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_created_at_accepts_date_only() {
        let v = normalize_update_value(Field::CreatedAt, "2024-03-01").unwrap();
        assert_eq!(v, "2024-03-01 00:00:00");
        let v = normalize_update_value(Field::CreatedAt, "2024-03-01 08:15:00").unwrap();
        assert_eq!(v, "2024-03-01 08:15:00");
        assert!(normalize_update_value(Field::CreatedAt, "yesterday").is_err());
    }

    #[test]
    fn test_normalize_category_stores_id() {
        let v = normalize_update_value(Field::Category, "证书").unwrap();
        assert_eq!(v, "certificate");
        assert!(normalize_update_value(Field::Category, "hobby").is_err());
    }

    #[test]
    fn test_normalize_rejects_id_and_blank_title() {
        let err = RecordError::from(normalize_update_value(Field::Id, "9").unwrap_err());
        assert_eq!(err.field.as_deref(), Some("id"));
        let err = RecordError::from(normalize_update_value(Field::Title, "   ").unwrap_err());
        assert_eq!(err.field.as_deref(), Some("title"));
    }
}
