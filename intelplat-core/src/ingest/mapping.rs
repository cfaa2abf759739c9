//! Per-row transforms from the bootstrap CSV layouts to table payloads
//!
//! Each CSV file has its own record type, deserialized by header name.
//! Columns the target table has but the file lacks get fixed defaults.

use crate::db::{Database, Table};
use crate::error::Result;
use crate::types::{NewDataset, NewIncident, NewTicket, IMPORTED_TICKET_SUBJECT};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Output format for derived timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted layouts for `created_at`, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Accepted layouts for a bare date, read as midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Largest resolution time we attempt to add, in hours
const MAX_RESOLUTION_HOURS: f64 = 1.0e9;

/// A bootstrap CSV file feeding one table.
pub trait CsvImport {
    /// Row layout of the CSV file
    type Record: DeserializeOwned;
    /// Payload inserted into the table
    type Target;

    /// Table receiving the rows
    const TABLE: Table;
    /// File name inside the data directory
    const FILE_NAME: &'static str;
    /// Columns that must be present in the header
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Pure per-row transform
    fn map(record: Self::Record) -> Self::Target;

    /// Append all mapped rows, returning how many were written
    fn insert(db: &Database, rows: &[Self::Target]) -> Result<usize>;
}

// ============================================
// cyber_incidents.csv
// ============================================

/// `incident_id, timestamp, severity, category, status, description`
#[derive(Debug, Deserialize)]
pub struct IncidentRecord {
    pub timestamp: String,
    pub severity: String,
    pub category: String,
    pub status: String,
    pub description: String,
}

pub struct IncidentsCsv;

impl CsvImport for IncidentsCsv {
    type Record = IncidentRecord;
    type Target = NewIncident;

    const TABLE: Table = Table::Incidents;
    const FILE_NAME: &'static str = "cyber_incidents.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &["timestamp", "severity", "category", "status", "description"];

    fn map(record: IncidentRecord) -> NewIncident {
        NewIncident {
            date: Some(record.timestamp),
            incident_type: record.category,
            severity: record.severity,
            status: record.status,
            description: Some(record.description),
            reported_by: None,
        }
    }

    fn insert(db: &Database, rows: &[NewIncident]) -> Result<usize> {
        db.insert_incidents(rows)
    }
}

// ============================================
// datasets_metadata.csv
// ============================================

/// `dataset_id, name, rows, columns, uploaded_by, upload_date`
#[derive(Debug, Deserialize)]
pub struct DatasetRecord {
    pub name: String,
    pub rows: String,
    pub uploaded_by: String,
    pub upload_date: String,
}

pub struct DatasetsCsv;

impl CsvImport for DatasetsCsv {
    type Record = DatasetRecord;
    type Target = NewDataset;

    const TABLE: Table = Table::Datasets;
    const FILE_NAME: &'static str = "datasets_metadata.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &["name", "rows", "uploaded_by", "upload_date"];

    fn map(record: DatasetRecord) -> NewDataset {
        NewDataset {
            record_count: parse_record_count(&record.rows),
            dataset_name: record.name,
            category: None,
            source: Some(record.uploaded_by),
            last_updated: Some(record.upload_date),
            file_size_mb: None,
        }
    }

    fn insert(db: &Database, rows: &[NewDataset]) -> Result<usize> {
        db.insert_datasets(rows)
    }
}

// ============================================
// it_tickets.csv
// ============================================

/// `ticket_id, priority, description, status, assigned_to, created_at, resolution_time_hours`
///
/// `resolution_time_hours` may be absent from the file.
#[derive(Debug, Deserialize)]
pub struct TicketRecord {
    pub ticket_id: String,
    pub priority: String,
    pub description: String,
    pub status: String,
    pub assigned_to: String,
    pub created_at: String,
    #[serde(default)]
    pub resolution_time_hours: Option<String>,
}

pub struct TicketsCsv;

impl CsvImport for TicketsCsv {
    type Record = TicketRecord;
    type Target = NewTicket;

    const TABLE: Table = Table::Tickets;
    const FILE_NAME: &'static str = "it_tickets.csv";
    const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "ticket_id",
        "priority",
        "description",
        "status",
        "assigned_to",
        "created_at",
    ];

    fn map(record: TicketRecord) -> NewTicket {
        let resolved_date =
            derive_resolved_date(&record.created_at, record.resolution_time_hours.as_deref());

        NewTicket {
            ticket_id: record.ticket_id,
            priority: record.priority,
            status: record.status,
            category: Some(record.assigned_to),
            subject: IMPORTED_TICKET_SUBJECT.to_string(),
            description: Some(record.description),
            created_date: Some(record.created_at),
            resolved_date,
        }
    }

    fn insert(db: &Database, rows: &[NewTicket]) -> Result<usize> {
        db.insert_tickets(rows)
    }
}

// ============================================
// Field parsing
// ============================================

/// Parse a row count. Whole reals like `100.0` count; anything else is `None`.
pub fn parse_record_count(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }

    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Parse a timestamp in any accepted layout. A bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `created_at` plus `hours`, formatted like `2024-01-01 05:00:00`.
///
/// `None` when either input does not parse.
pub fn derive_resolved_date(created_at: &str, hours: Option<&str>) -> Option<String> {
    let created = parse_timestamp(created_at)?;
    let hours = hours?.trim().parse::<f64>().ok()?;
    if !hours.is_finite() || hours.abs() > MAX_RESOLUTION_HOURS {
        return None;
    }

    let offset = Duration::milliseconds((hours * 3_600_000.0).round() as i64);
    created
        .checked_add_signed(offset)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}
