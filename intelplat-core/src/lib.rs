//! # intelplat-core
//!
//! Core library for intelplat - a cyber incident, IT ticket and dataset
//! metadata tracker.
//!
//! This library provides:
//! - Domain types for users, incidents, datasets and tickets
//! - Database storage layer with SQLite
//! - One-time CSV bootstrap loading
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use intelplat_core::{Config, Database, NewIncident};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&config.storage.database_path()).expect("failed to open database");
//! db.migrate().expect("failed to create schema");
//!
//! let id = db
//!     .insert_incident(&NewIncident::new("Phishing", "High"))
//!     .expect("failed to insert incident");
//! assert!(db.get_incident(id).unwrap().is_some());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{Database, Table};
pub use error::{Error, Result};
pub use ingest::{load_initial_data, setup_database, LoadReport, SetupSummary, TableOutcome};
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod types;
