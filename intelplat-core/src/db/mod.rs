//! Database layer for intelplat
//!
//! This module provides the storage layer using SQLite with:
//! - Schema creation via versioned migrations
//! - Repository methods per entity (incidents, tickets, datasets, users)
//! - Grouped-count aggregate queries

mod datasets;
mod incidents;
pub mod repo;
pub mod schema;
mod tickets;
mod users;

pub use repo::Database;
pub use schema::{ensure_schema, Table};
