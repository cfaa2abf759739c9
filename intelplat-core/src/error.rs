//! Error types for intelplat-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the intelplat-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error, including constraint violations on unique keys
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A bootstrap CSV file lacks a column the mapping requires
    #[error("{} is missing required column '{column}'", file.display())]
    MissingColumn { file: PathBuf, column: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The connection mutex was poisoned by a panicking holder
    #[error("database connection lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// True when the error is a storage-level constraint violation
    /// (duplicate username, dataset name or ticket id).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

/// Result type alias for intelplat-core
pub type Result<T> = std::result::Result<T, Error>;
