//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.
//! Every statement is `IF NOT EXISTS`, so applying the list against a
//! database created by an older tool is harmless.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1 + MIGRATIONS.len() as i32;

/// Tables owned by this schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Incidents,
    Datasets,
    Tickets,
}

impl Table {
    /// All tables, in creation order
    pub const ALL: [Table; 4] = [Table::Users, Table::Incidents, Table::Datasets, Table::Tickets];

    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Incidents => "cyber_incidents",
            Table::Datasets => "datasets_metadata",
            Table::Tickets => "it_tickets",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Version 1: users, incidents, dataset metadata, tickets.
///
/// Applied on every call; each statement is `IF NOT EXISTS`.
const BASE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    username         TEXT NOT NULL UNIQUE,
    password_hash    TEXT NOT NULL,
    role             TEXT DEFAULT 'user',
    created_at       TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS cyber_incidents (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    date             TEXT,               -- free text, as reported
    incident_type    TEXT NOT NULL,
    severity         TEXT NOT NULL,      -- 'Low', 'Medium', 'High'
    status           TEXT DEFAULT 'open',
    description      TEXT,
    reported_by      TEXT,
    created_at       TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS datasets_metadata (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    dataset_name     TEXT NOT NULL UNIQUE,
    category         TEXT,
    source           TEXT,
    last_updated     TEXT,
    record_count     INTEGER,
    file_size_mb     REAL,
    created_at       TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS it_tickets (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_id        TEXT NOT NULL UNIQUE,
    priority         TEXT NOT NULL,
    status           TEXT DEFAULT 'open',
    category         TEXT,
    subject          TEXT NOT NULL,
    description      TEXT,
    created_date     TEXT,
    resolved_date    TEXT,
    created_at       TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Migrations on top of the base schema; entry `i` is version `i + 2`
const MIGRATIONS: &[&str] = &[];

/// Create any missing tables. Safe to call on every startup.
pub fn ensure_schema(conn: &Connection) -> crate::error::Result<()> {
    conn.execute_batch(BASE_SCHEMA)?;
    if get_schema_version(conn)? < 1 {
        conn.pragma_update(None, "user_version", 1)?;
    }

    run_migrations(conn)
}

/// Run all pending migrations past the base schema
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version = get_schema_version(conn)?;

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 2) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.pragma_update(None, "user_version", version)?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
