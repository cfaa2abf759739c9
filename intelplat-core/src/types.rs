//! Core domain types for intelplat
//!
//! One struct per stored entity, plus the payload structs used for inserts
//! and full updates. Records are independent: `reported_by` on an incident
//! and `source` on a dataset are free text, not references to a [`User`].
//!
//! Severity, status and priority stay plain strings. Values are compared
//! exactly as stored, so `"Open"` and `"open"` are different statuses.

use serde::{Deserialize, Serialize};

/// Severity value matched by the high-severity aggregate.
pub const HIGH_SEVERITY: &str = "High";

/// Role assigned to users inserted without an explicit role.
pub const DEFAULT_ROLE: &str = "user";

/// Status the schema assigns when none is supplied.
pub const DEFAULT_STATUS: &str = "open";

/// Subject given to every ticket imported from CSV.
pub const IMPORTED_TICKET_SUBJECT: &str = "Imported ticket";

// ============================================
// User
// ============================================

/// A stored account. The hash is opaque to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Option<String>,
    pub created_at: Option<String>,
}

/// Fields supplied when creating a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

impl NewUser {
    /// A user with the default role.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            role: DEFAULT_ROLE.to_string(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}

// ============================================
// Incident
// ============================================

/// A cyber incident row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    /// Free-text date as reported
    pub date: Option<String>,
    pub incident_type: String,
    pub severity: String,
    pub status: Option<String>,
    pub description: Option<String>,
    pub reported_by: Option<String>,
    pub created_at: Option<String>,
}

/// Editable incident fields, used for both insert and full update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncident {
    pub date: Option<String>,
    pub incident_type: String,
    pub severity: String,
    pub status: String,
    pub description: Option<String>,
    pub reported_by: Option<String>,
}

impl NewIncident {
    /// An open incident with only the required fields set.
    pub fn new(incident_type: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            date: None,
            incident_type: incident_type.into(),
            severity: severity.into(),
            status: DEFAULT_STATUS.to_string(),
            description: None,
            reported_by: None,
        }
    }
}

// ============================================
// Dataset metadata
// ============================================

/// Metadata describing one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub id: i64,
    pub dataset_name: String,
    pub category: Option<String>,
    pub source: Option<String>,
    pub last_updated: Option<String>,
    pub record_count: Option<i64>,
    pub file_size_mb: Option<f64>,
    pub created_at: Option<String>,
}

/// Editable dataset fields, used for both insert and full update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewDataset {
    pub dataset_name: String,
    pub category: Option<String>,
    pub source: Option<String>,
    pub last_updated: Option<String>,
    pub record_count: Option<i64>,
    pub file_size_mb: Option<f64>,
}

// ============================================
// Ticket
// ============================================

/// An IT support ticket row.
///
/// `id` is the storage key; `ticket_id` is the business identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub ticket_id: String,
    pub priority: String,
    pub status: Option<String>,
    pub category: Option<String>,
    pub subject: String,
    pub description: Option<String>,
    pub created_date: Option<String>,
    pub resolved_date: Option<String>,
    pub created_at: Option<String>,
}

/// Editable ticket fields, used for both insert and full update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub ticket_id: String,
    pub priority: String,
    pub status: String,
    pub category: Option<String>,
    pub subject: String,
    pub description: Option<String>,
    pub created_date: Option<String>,
    pub resolved_date: Option<String>,
}

impl NewTicket {
    /// An open ticket with only the required fields set.
    pub fn new(
        ticket_id: impl Into<String>,
        priority: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            priority: priority.into(),
            status: DEFAULT_STATUS.to_string(),
            category: None,
            subject: subject.into(),
            description: None,
            created_date: None,
            resolved_date: None,
        }
    }
}

// ============================================
// Query results
// ============================================

/// One row of a grouped aggregate: the group key and its count.
///
/// The key is optional because grouped columns are nullable (datasets
/// imported from CSV have no category, for example).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: Option<String>,
    pub count: i64,
}

impl GroupCount {
    pub fn new(key: impl Into<String>, count: i64) -> Self {
        Self {
            key: Some(key.into()),
            count,
        }
    }

    /// Key for display, with a placeholder for NULL groups.
    pub fn label(&self) -> &str {
        self.key.as_deref().unwrap_or("(none)")
    }
}

/// Number of rows an update or delete touched.
///
/// Zero is the only not-found signal; an unmatched id is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RowsAffected(pub usize);

impl RowsAffected {
    pub fn rows(self) -> usize {
        self.0
    }

    /// True when no row matched.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for RowsAffected {
    fn from(n: usize) -> Self {
        Self(n)
    }
}
