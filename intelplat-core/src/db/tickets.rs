//! IT ticket repository

use super::repo::Database;
use crate::error::{Error, Result};
use crate::types::{GroupCount, NewTicket, RowsAffected, Ticket};
use rusqlite::{params, OptionalExtension, Row};

const SELECT_TICKET: &str = "SELECT id, ticket_id, priority, status, category, subject, \
     description, created_date, resolved_date, created_at FROM it_tickets";

const INSERT_TICKET: &str = r#"
    INSERT INTO it_tickets (ticket_id, priority, status, category, subject, description,
                            created_date, resolved_date)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

impl Database {
    /// Insert a ticket and return its storage id
    pub fn insert_ticket(&self, ticket: &NewTicket) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            INSERT_TICKET,
            params![
                ticket.ticket_id,
                ticket.priority,
                ticket.status,
                ticket.category,
                ticket.subject,
                ticket.description,
                ticket.created_date,
                ticket.resolved_date,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert many tickets in one transaction, returning how many were written
    pub fn insert_tickets(&self, tickets: &[NewTicket]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(INSERT_TICKET)?;
            for ticket in tickets {
                stmt.execute(params![
                    ticket.ticket_id,
                    ticket.priority,
                    ticket.status,
                    ticket.category,
                    ticket.subject,
                    ticket.description,
                    ticket.created_date,
                    ticket.resolved_date,
                ])?;
            }
        }

        tx.commit()?;
        Ok(tickets.len())
    }

    /// All tickets, newest id first
    pub fn list_tickets(&self) -> Result<Vec<Ticket>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{SELECT_TICKET} ORDER BY id DESC"))?;

        let tickets = stmt
            .query_map([], Self::row_to_ticket)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    /// Get a ticket by storage id
    pub fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("{SELECT_TICKET} WHERE id = ?"),
            [id],
            Self::row_to_ticket,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Replace every editable column of a ticket
    pub fn update_ticket(&self, id: i64, ticket: &NewTicket) -> Result<RowsAffected> {
        let conn = self.lock()?;
        let n = conn.execute(
            r#"
            UPDATE it_tickets
            SET ticket_id = ?1,
                priority = ?2,
                status = ?3,
                category = ?4,
                subject = ?5,
                description = ?6,
                created_date = ?7,
                resolved_date = ?8
            WHERE id = ?9
            "#,
            params![
                ticket.ticket_id,
                ticket.priority,
                ticket.status,
                ticket.category,
                ticket.subject,
                ticket.description,
                ticket.created_date,
                ticket.resolved_date,
                id,
            ],
        )?;
        Ok(RowsAffected(n))
    }

    /// Set only the status of a ticket
    pub fn update_ticket_status(&self, id: i64, status: &str) -> Result<RowsAffected> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE it_tickets SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;
        Ok(RowsAffected(n))
    }

    /// Set only the priority of a ticket
    pub fn update_ticket_priority(&self, id: i64, priority: &str) -> Result<RowsAffected> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE it_tickets SET priority = ?1 WHERE id = ?2",
            params![priority, id],
        )?;
        Ok(RowsAffected(n))
    }

    /// Delete a ticket by storage id
    pub fn delete_ticket(&self, id: i64) -> Result<RowsAffected> {
        let conn = self.lock()?;
        let n = conn.execute("DELETE FROM it_tickets WHERE id = ?", [id])?;
        Ok(RowsAffected(n))
    }

    /// Ticket counts grouped by status
    pub fn count_tickets_by_status(&self) -> Result<Vec<GroupCount>> {
        self.query_group_counts(
            r#"
            SELECT status, COUNT(*) AS count
            FROM it_tickets
            GROUP BY status
            ORDER BY count DESC
            "#,
            [],
        )
    }

    /// Ticket counts grouped by priority
    pub fn count_tickets_by_priority(&self) -> Result<Vec<GroupCount>> {
        self.query_group_counts(
            r#"
            SELECT priority, COUNT(*) AS count
            FROM it_tickets
            GROUP BY priority
            ORDER BY count DESC
            "#,
            [],
        )
    }

    fn row_to_ticket(row: &Row) -> rusqlite::Result<Ticket> {
        Ok(Ticket {
            id: row.get("id")?,
            ticket_id: row.get("ticket_id")?,
            priority: row.get("priority")?,
            status: row.get("status")?,
            category: row.get("category")?,
            subject: row.get("subject")?,
            description: row.get("description")?,
            created_date: row.get("created_date")?,
            resolved_date: row.get("resolved_date")?,
            created_at: row.get("created_at")?,
        })
    }
}
