use agentmem_core::{NewSummary, Summary};
use chrono::Utc;
use rusqlite::{Row, params};

use super::{Storage, get_conn, log_row_error, parse_timestamp};
use crate::error::Result;

pub(crate) const SUMMARY_COLUMNS: &str = "s.id, s.session_id, s.project, s.request, \
     s.investigated, s.learned, s.completed, s.next_steps, s.notes, s.prompt_number, \
     s.created_at, s.created_at_epoch";

impl Storage {
    /// Insert a session summary and return its id.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn create_summary(&self, summary: &NewSummary) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO session_summaries
               (session_id, project, request, investigated, learned, completed, next_steps,
                notes, prompt_number, created_at, created_at_epoch)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                summary.session_id,
                summary.project,
                summary.request,
                summary.investigated,
                summary.learned,
                summary.completed,
                summary.next_steps,
                summary.notes,
                summary.prompt_number,
                now.to_rfc3339(),
                now.timestamp_millis(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get summary by id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_summary(&self, id: i64) -> Result<Option<Summary>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn
            .prepare(&format!("SELECT {SUMMARY_COLUMNS} FROM session_summaries s WHERE s.id = ?1"))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::row_to_summary(row)?)),
            None => Ok(None),
        }
    }

    /// Latest summary recorded for a session.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_session_summary(&self, session_id: &str) -> Result<Option<Summary>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM session_summaries s
               WHERE s.session_id = ?1 ORDER BY s.created_at_epoch DESC, s.id DESC LIMIT 1"
        ))?;
        let mut rows = stmt.query(params![session_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::row_to_summary(row)?)),
            None => Ok(None),
        }
    }

    /// Newest summaries of a project.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_project_summaries(&self, project: &str, limit: usize) -> Result<Vec<Summary>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM session_summaries s
               WHERE s.project = ?1 ORDER BY s.created_at_epoch DESC, s.id DESC LIMIT ?2"
        ))?;
        let results = stmt
            .query_map(params![project, limit as i64], Self::row_to_summary)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    pub(crate) fn row_to_summary(row: &Row<'_>) -> rusqlite::Result<Summary> {
        Ok(Summary {
            id: row.get(0)?,
            session_id: row.get(1)?,
            project: row.get(2)?,
            request: row.get(3)?,
            investigated: row.get(4)?,
            learned: row.get(5)?,
            completed: row.get(6)?,
            next_steps: row.get(7)?,
            notes: row.get(8)?,
            prompt_number: row.get(9)?,
            created_at: parse_timestamp(10, &row.get::<_, String>(10)?)?,
            created_at_epoch: row.get(11)?,
        })
    }
}
