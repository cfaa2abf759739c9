//! Cyber incident repository

use super::repo::Database;
use crate::error::{Error, Result};
use crate::types::{GroupCount, Incident, NewIncident, RowsAffected, HIGH_SEVERITY};
use rusqlite::{params, OptionalExtension, Row};

const SELECT_INCIDENT: &str = "SELECT id, date, incident_type, severity, status, description, \
     reported_by, created_at FROM cyber_incidents";

impl Database {
    /// Insert an incident and return its id
    pub fn insert_incident(&self, incident: &NewIncident) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO cyber_incidents (date, incident_type, severity, status, description, reported_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                incident.date,
                incident.incident_type,
                incident.severity,
                incident.status,
                incident.description,
                incident.reported_by,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert many incidents in one transaction, returning how many were written
    pub fn insert_incidents(&self, incidents: &[NewIncident]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO cyber_incidents (date, incident_type, severity, status, description, reported_by)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for incident in incidents {
                stmt.execute(params![
                    incident.date,
                    incident.incident_type,
                    incident.severity,
                    incident.status,
                    incident.description,
                    incident.reported_by,
                ])?;
            }
        }

        tx.commit()?;
        Ok(incidents.len())
    }

    /// All incidents, newest id first
    pub fn list_incidents(&self) -> Result<Vec<Incident>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{SELECT_INCIDENT} ORDER BY id DESC"))?;

        let incidents = stmt
            .query_map([], Self::row_to_incident)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(incidents)
    }

    /// Get an incident by id
    pub fn get_incident(&self, id: i64) -> Result<Option<Incident>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("{SELECT_INCIDENT} WHERE id = ?"),
            [id],
            Self::row_to_incident,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Replace every editable column of an incident
    pub fn update_incident(&self, id: i64, incident: &NewIncident) -> Result<RowsAffected> {
        let conn = self.lock()?;
        let n = conn.execute(
            r#"
            UPDATE cyber_incidents
            SET date = ?1,
                incident_type = ?2,
                severity = ?3,
                status = ?4,
                description = ?5,
                reported_by = ?6
            WHERE id = ?7
            "#,
            params![
                incident.date,
                incident.incident_type,
                incident.severity,
                incident.status,
                incident.description,
                incident.reported_by,
                id,
            ],
        )?;
        Ok(RowsAffected(n))
    }

    /// Set only the status of an incident
    pub fn update_incident_status(&self, id: i64, status: &str) -> Result<RowsAffected> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE cyber_incidents SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;
        tracing::debug!(id, status, rows = n, "Updated incident status");
        Ok(RowsAffected(n))
    }

    /// Delete an incident by id
    pub fn delete_incident(&self, id: i64) -> Result<RowsAffected> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM cyber_incidents WHERE id = ?", [id])?;
        Ok(RowsAffected(n))
    }

    /// Incident counts grouped by type
    pub fn count_incidents_by_type(&self) -> Result<Vec<GroupCount>> {
        self.query_group_counts(
            r#"
            SELECT incident_type, COUNT(*) AS count
            FROM cyber_incidents
            GROUP BY incident_type
            ORDER BY count DESC
            "#,
            [],
        )
    }

    /// Incident counts grouped by status
    pub fn count_incidents_by_status(&self) -> Result<Vec<GroupCount>> {
        self.query_group_counts(
            r#"
            SELECT status, COUNT(*) AS count
            FROM cyber_incidents
            GROUP BY status
            ORDER BY count DESC
            "#,
            [],
        )
    }

    /// Status breakdown of incidents whose severity is exactly "High"
    pub fn count_high_severity_incidents_by_status(&self) -> Result<Vec<GroupCount>> {
        self.query_group_counts(
            r#"
            SELECT status, COUNT(*) AS count
            FROM cyber_incidents
            WHERE severity = ?1
            GROUP BY status
            ORDER BY count DESC
            "#,
            [HIGH_SEVERITY],
        )
    }

    /// Incident types with strictly more than `min_count` incidents
    pub fn incident_types_with_count_above(&self, min_count: i64) -> Result<Vec<GroupCount>> {
        self.query_group_counts(
            r#"
            SELECT incident_type, COUNT(*) AS count
            FROM cyber_incidents
            GROUP BY incident_type
            HAVING COUNT(*) > ?1
            ORDER BY count DESC
            "#,
            [min_count],
        )
    }

    fn row_to_incident(row: &Row) -> rusqlite::Result<Incident> {
        Ok(Incident {
            id: row.get("id")?,
            date: row.get("date")?,
            incident_type: row.get("incident_type")?,
            severity: row.get("severity")?,
            status: row.get("status")?,
            description: row.get("description")?,
            reported_by: row.get("reported_by")?,
            created_at: row.get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn incident(incident_type: &str, severity: &str, status: &str) -> NewIncident {
        NewIncident {
            date: Some("2024-11-05".to_string()),
            incident_type: incident_type.to_string(),
            severity: severity.to_string(),
            status: status.to_string(),
            description: Some("Suspicious email detected".to_string()),
            reported_by: None,
        }
    }

    #[test]
    fn test_incident_round_trip() {
        let db = test_db();
        let new = incident("Phishing", "High", "Open");

        let id = db.insert_incident(&new).unwrap();
        let stored = db.get_incident(id).unwrap().unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.date.as_deref(), Some("2024-11-05"));
        assert_eq!(stored.incident_type, "Phishing");
        assert_eq!(stored.severity, "High");
        assert_eq!(stored.status.as_deref(), Some("Open"));
        assert_eq!(stored.reported_by, None);
        assert!(stored.created_at.is_some());
    }

    #[test]
    fn test_list_is_newest_first() {
        let db = test_db();
        let first = db.insert_incident(&incident("Phishing", "Low", "Open")).unwrap();
        let second = db.insert_incident(&incident("Malware", "Low", "Open")).unwrap();

        let ids: Vec<i64> = db.list_incidents().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_status_update_contract() {
        let db = test_db();
        let id = db.insert_incident(&incident("Phishing", "High", "Open")).unwrap();

        assert_eq!(db.update_incident_status(id + 100, "Closed").unwrap(), RowsAffected(0));
        assert_eq!(
            db.get_incident(id).unwrap().unwrap().status.as_deref(),
            Some("Open")
        );

        assert_eq!(db.update_incident_status(id, "Resolved").unwrap(), RowsAffected(1));
        assert_eq!(
            db.get_incident(id).unwrap().unwrap().status.as_deref(),
            Some("Resolved")
        );
    }

    #[test]
    fn test_full_update_replaces_fields() {
        let db = test_db();
        let id = db.insert_incident(&incident("Phishing", "High", "Open")).unwrap();

        let replacement = NewIncident {
            date: None,
            incident_type: "Ransomware".to_string(),
            severity: "Medium".to_string(),
            status: "In Progress".to_string(),
            description: None,
            reported_by: Some("carol".to_string()),
        };
        assert_eq!(db.update_incident(id, &replacement).unwrap(), RowsAffected(1));

        let stored = db.get_incident(id).unwrap().unwrap();
        assert_eq!(stored.date, None);
        assert_eq!(stored.incident_type, "Ransomware");
        assert_eq!(stored.description, None);
        assert_eq!(stored.reported_by.as_deref(), Some("carol"));
    }

    #[test]
    fn test_delete_contract() {
        let db = test_db();
        let keep = db.insert_incident(&incident("Phishing", "High", "Open")).unwrap();
        let gone = db.insert_incident(&incident("Malware", "Low", "Open")).unwrap();

        assert!(db.delete_incident(gone + 1).unwrap().is_none());
        assert_eq!(db.delete_incident(gone).unwrap(), RowsAffected(1));
        assert!(db.get_incident(gone).unwrap().is_none());
        assert!(db.get_incident(keep).unwrap().is_some());
    }

    #[test]
    fn test_high_severity_by_status() {
        let db = test_db();
        db.insert_incident(&incident("Phishing", "High", "Open")).unwrap();
        db.insert_incident(&incident("Phishing", "High", "Closed")).unwrap();
        db.insert_incident(&incident("Malware", "Low", "Open")).unwrap();

        let mut counts = db.count_high_severity_incidents_by_status().unwrap();
        counts.sort_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(
            counts,
            vec![GroupCount::new("Closed", 1), GroupCount::new("Open", 1)]
        );
    }

    #[test]
    fn test_severity_match_is_case_sensitive() {
        let db = test_db();
        db.insert_incident(&incident("Phishing", "high", "Open")).unwrap();

        assert!(db.count_high_severity_incidents_by_status().unwrap().is_empty());
    }

    #[test]
    fn test_types_with_count_above_is_strict() {
        let db = test_db();
        for _ in 0..3 {
            db.insert_incident(&incident("Phishing", "Low", "Open")).unwrap();
        }
        for _ in 0..2 {
            db.insert_incident(&incident("Malware", "Low", "Open")).unwrap();
        }

        let counts = db.incident_types_with_count_above(2).unwrap();
        assert_eq!(counts, vec![GroupCount::new("Phishing", 3)]);

        let by_type = db.count_incidents_by_type().unwrap();
        assert_eq!(
            by_type,
            vec![GroupCount::new("Phishing", 3), GroupCount::new("Malware", 2)]
        );
    }
}
