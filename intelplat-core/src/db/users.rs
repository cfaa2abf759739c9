//! User repository
//!
//! Stores and returns password hashes opaquely; hashing and login policy
//! belong to the caller.

use super::repo::Database;
use crate::error::{Error, Result};
use crate::types::{NewUser, User};
use rusqlite::{params, OptionalExtension, Row};

impl Database {
    /// Find a user by username
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = ?",
            [username],
            Self::row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Insert a user and return its id.
    ///
    /// A taken username fails with a constraint violation.
    pub fn insert_user(&self, user: &NewUser) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![user.username, user.password_hash, user.role],
        )?;
        tracing::info!(username = %user.username, role = %user.role, "Inserted user");
        Ok(conn.last_insert_rowid())
    }

    /// Count stored users
    pub fn count_users(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
        Ok(count)
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get("id")?,
            username: row.get("username")?,
            password_hash: row.get("password_hash")?,
            role: row.get("role")?,
            created_at: row.get("created_at")?,
        })
    }
}
