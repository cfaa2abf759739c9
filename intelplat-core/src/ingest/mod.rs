//! Bootstrap ingestion of the coursework CSV files
//!
//! Maps three external CSV files onto the incident, dataset and ticket
//! tables. Loading is load-once: a table that already holds any row is
//! skipped, so repeated startups never duplicate data.
//!
//! ```text
//! ┌──────────────────────┐     ┌───────────────┐     ┌───────────────────┐
//! │ DATA/*.csv           │ ──► │  CsvImport    │ ──► │     Database      │
//! │ cyber_incidents.csv  │     │  (row map)    │     │ cyber_incidents   │
//! │ datasets_metadata.csv│     │               │     │ datasets_metadata │
//! │ it_tickets.csv       │     │               │     │ it_tickets        │
//! └──────────────────────┘     └───────────────┘     └───────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use intelplat_core::{ingest, Database};
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("DATA/intelligence_platform.db"))?;
//! db.migrate()?;
//! let report = ingest::load_initial_data(&db, Path::new("DATA"))?;
//! println!("Loaded {} rows", report.total_inserted());
//! # Ok::<(), intelplat_core::Error>(())
//! ```

pub mod mapping;
pub mod users;

pub use mapping::{CsvImport, DatasetsCsv, IncidentsCsv, TicketsCsv};
pub use users::{migrate_users_from_file, USERS_FILE};

use crate::db::{Database, Table};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// What happened to one table during a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// Rows were read from the file and appended
    Loaded(usize),
    /// The table already had rows
    SkippedNonEmpty,
    /// No CSV file at the expected path
    FileMissing(PathBuf),
}

/// Per-table outcomes of [`load_initial_data`], in load order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub tables: Vec<(Table, TableOutcome)>,
}

impl LoadReport {
    /// Total rows inserted across all tables in this run
    pub fn total_inserted(&self) -> usize {
        self.tables
            .iter()
            .map(|(_, outcome)| match outcome {
                TableOutcome::Loaded(n) => *n,
                _ => 0,
            })
            .sum()
    }

    /// Outcome for a given table, if it was part of the run
    pub fn outcome(&self, table: Table) -> Option<&TableOutcome> {
        self.tables
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, outcome)| outcome)
    }
}

/// Result of [`setup_database`].
#[derive(Debug, Clone)]
pub struct SetupSummary {
    pub users_migrated: usize,
    pub load: LoadReport,
    pub table_counts: Vec<(Table, i64)>,
}

/// Load the three bootstrap CSV files from `data_dir`.
///
/// Tables are processed in order (incidents, datasets, tickets). A file
/// missing a required column stops the run with [`Error::MissingColumn`];
/// tables loaded earlier in the run keep their rows.
pub fn load_initial_data(db: &Database, data_dir: &Path) -> Result<LoadReport> {
    let mut report = LoadReport::default();

    report
        .tables
        .push((IncidentsCsv::TABLE, load_table::<IncidentsCsv>(db, data_dir)?));
    report
        .tables
        .push((DatasetsCsv::TABLE, load_table::<DatasetsCsv>(db, data_dir)?));
    report
        .tables
        .push((TicketsCsv::TABLE, load_table::<TicketsCsv>(db, data_dir)?));

    tracing::info!(total = report.total_inserted(), "CSV bootstrap finished");
    Ok(report)
}

/// Create the schema, import legacy users and load the CSV files.
pub fn setup_database(db: &Database, data_dir: &Path) -> Result<SetupSummary> {
    db.migrate()?;
    let users_migrated = migrate_users_from_file(db, &data_dir.join(USERS_FILE))?;
    let load = load_initial_data(db, data_dir)?;
    let table_counts = db.table_counts()?;

    Ok(SetupSummary {
        users_migrated,
        load,
        table_counts,
    })
}

/// Load one table if it is empty and its file exists.
pub fn load_table<I: CsvImport>(db: &Database, data_dir: &Path) -> Result<TableOutcome> {
    let table = I::TABLE;

    if db.count_rows(table)? > 0 {
        tracing::info!(%table, "Skipping table (already has data)");
        return Ok(TableOutcome::SkippedNonEmpty);
    }

    let path = data_dir.join(I::FILE_NAME);
    if !path.exists() {
        tracing::warn!(%table, path = %path.display(), "CSV file not found");
        return Ok(TableOutcome::FileMissing(path));
    }

    let rows = read_rows::<I>(&path)?;
    let inserted = I::insert(db, &rows)?;

    tracing::info!(%table, rows = inserted, path = %path.display(), "Loaded CSV file");
    Ok(TableOutcome::Loaded(inserted))
}

/// Read and map every row of a CSV file, checking the header first.
fn read_rows<I: CsvImport>(path: &Path) -> Result<Vec<I::Target>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_path(path)?;

    let headers = reader.headers()?.clone();
    if let Some(missing) = I::REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(Error::MissingColumn {
            file: path.to_path_buf(),
            column: missing.to_string(),
        });
    }

    reader
        .deserialize::<I::Record>()
        .map(|record| record.map(I::map).map_err(Error::from))
        .collect()
}
