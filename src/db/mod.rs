//! Database layer for the records manager.

pub mod import;
pub mod query;
pub mod records;
pub mod stats;

use crate::types::{Category, Record};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Columns selected for a [`Record`], in table order.
pub const RECORD_COLUMNS: &str = "id, name, title, category, created_at, notes";

/// Database handle wrapping a SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;
        debug!(path = %path.as_ref().display(), "Database opened");

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            embedded::migrations::runner().run(conn)?;
            Ok(())
        })
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        f(&conn)
    }

    /// Execute a function with mutable access to the connection (for transactions).
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        f(&mut conn)
    }
}

/// Map a row selected with [`RECORD_COLUMNS`] to a [`Record`].
///
/// Category text that no longer parses is read back as `other`.
pub fn parse_record_row(row: &Row) -> rusqlite::Result<Record> {
    let category: String = row.get("category")?;
    Ok(Record {
        id: row.get("id")?,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        title: row.get("title")?,
        category: Category::parse(&category).unwrap_or(Category::Other),
        created_at: row.get("created_at")?,
        notes: row.get::<_, Option<String>>("notes")?.unwrap_or_default(),
    })
}
