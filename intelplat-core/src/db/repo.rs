//! Database handle and shared query helpers
//!
//! Entity operations live in sibling modules as further `impl Database`
//! blocks: [`super::incidents`], [`super::tickets`], [`super::datasets`]
//! and [`super::users`].

use super::schema::Table;
use crate::error::{Error, Result};
use crate::types::GroupCount;
use rusqlite::{Connection, Params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Database handle owning a single connection for the process lifetime.
///
/// Each repository call holds the lock for one statement and releases it
/// on return, on success or error alike.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create any missing tables
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        super::schema::ensure_schema(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.lock()
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Run a `SELECT key, COUNT(*)`-shaped query into [`GroupCount`] rows.
    pub(crate) fn query_group_counts<P: Params>(&self, sql: &str, params: P) -> Result<Vec<GroupCount>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;

        let rows = stmt
            .query_map(params, |row| {
                Ok(GroupCount {
                    key: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    // ============================================
    // Statistics
    // ============================================

    /// Number of rows currently in a table
    pub fn count_rows(&self, table: Table) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name()),
            [],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    /// Row counts for every table, in creation order
    pub fn table_counts(&self) -> Result<Vec<(Table, i64)>> {
        Table::ALL
            .iter()
            .map(|&table| Ok((table, self.count_rows(table)?)))
            .collect()
    }
}
