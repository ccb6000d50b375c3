//! Aggregation queries for the summary view.

use super::Database;
use crate::types::{Category, CategoryCount, RecordStats};
use anyhow::Result;
use rusqlite::OptionalExtension;
use std::collections::HashMap;

impl Database {
    /// Totals, latest timestamp and per-category counts.
    ///
    /// Category text that no longer parses is counted as `other`.
    pub fn stats(&self) -> Result<RecordStats> {
        self.with_conn(|conn| {
            let (total, latest): (i64, Option<String>) = conn
                .query_row(
                    "SELECT COUNT(*), MAX(created_at) FROM records",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
                .unwrap_or((0, None));

            let mut stmt =
                conn.prepare("SELECT category, COUNT(*) FROM records GROUP BY category")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut counts: HashMap<Category, i64> = HashMap::new();
            for (raw, count) in rows {
                let category = Category::parse(&raw).unwrap_or(Category::Other);
                *counts.entry(category).or_insert(0) += count;
            }

            let mut by_category: Vec<CategoryCount> = counts
                .into_iter()
                .map(|(category, count)| CategoryCount { category, count })
                .collect();
            // Largest first; ties in display order
            by_category.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));

            Ok(RecordStats {
                total,
                category_count: by_category.len(),
                latest,
                by_category,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewRecord;

    #[test]
    fn test_stats_empty() {
        let db = Database::open_in_memory().unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.category_count, 0);
        assert!(stats.latest.is_none());
        assert!(stats.by_category.is_empty());
    }

    #[test]
    fn test_stats_orders_by_count_then_category() {
        let db = Database::open_in_memory().unwrap();
        db.insert_record(NewRecord::new("A", Category::Certificate)).unwrap();
        db.insert_record(NewRecord::new("B", Category::Certificate)).unwrap();
        db.insert_record(NewRecord::new("C", Category::Account)).unwrap();
        db.insert_record(NewRecord::new("D", Category::Honor)).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.category_count, 3);
        assert!(stats.latest.is_some());
        let order: Vec<Category> = stats.by_category.iter().map(|c| c.category).collect();
        assert_eq!(
            order,
            vec![Category::Certificate, Category::Honor, Category::Account]
        );
    }

    #[test]
    fn test_stats_folds_unknown_category_into_other() {
        let db = Database::open_in_memory().unwrap();
        db.insert_record(NewRecord::new("A", Category::Other)).unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO records (title, category, created_at) VALUES ('X', 'legacy', datetime('now'))",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.category_count, 1);
        assert_eq!(stats.by_category[0].category, Category::Other);
        assert_eq!(stats.by_category[0].count, 2);
    }
}
