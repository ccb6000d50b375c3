//! Bulk insert of imported records.

use super::Database;
use super::records::insert_record_conn;
use crate::types::NewRecord;
use anyhow::Result;
use serde::Serialize;
use tracing::debug;

/// Outcome of a CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    /// Rows skipped because they had no title.
    pub skipped: usize,
    pub warnings: Vec<String>,
}

impl Database {
    /// Insert records in a single transaction. Either every record is
    /// written or none are.
    pub fn import_records(&self, records: &[NewRecord]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for record in records {
                insert_record_conn(&tx, record)?;
            }
            tx.commit()?;
            debug!(count = records.len(), "Import transaction committed");
            Ok(records.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn test_import_records_is_atomic() {
        let db = Database::open_in_memory().unwrap();
        let records = vec![
            NewRecord::new("Good", Category::Honor),
            NewRecord::new("  ", Category::Honor),
        ];
        assert!(db.import_records(&records).is_err());
        assert!(db.list_all().unwrap().is_empty());

        let count = db
            .import_records(&[NewRecord::new("Good", Category::Honor)])
            .unwrap();
        assert_eq!(count, 1);
    }
}
