use agentmem_core::{Session, SessionStatus};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, Row, params};

use super::{Storage, get_conn, log_row_error, parse_timestamp};
use crate::error::Result;

const SESSION_COLUMNS: &str = "id, content_session_id, project, user_prompt, memory_session_id, \
     status, started_at, started_at_epoch, completed_at, completed_at_epoch";

impl Storage {
    /// Return the session for `content_session_id`, creating an active one
    /// if none exists. An existing session is returned unchanged.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn create_or_get_session(
        &self,
        content_session_id: &str,
        project: &str,
        user_prompt: Option<&str>,
    ) -> Result<Session> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO sessions
               (content_session_id, project, user_prompt, status, started_at, started_at_epoch)
               VALUES (?1, ?2, ?3, 'active', ?4, ?5)",
            params![content_session_id, project, user_prompt, now.to_rfc3339(), now.timestamp_millis()],
        )?;
        if inserted > 0 {
            tracing::debug!(content_session_id, project, "Session started");
        }
        let session = conn.query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE content_session_id = ?1"),
            params![content_session_id],
            Self::row_to_session,
        )?;
        Ok(session)
    }

    /// Get session by row id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_session(&self, id: i64) -> Result<Option<Session>> {
        let conn = get_conn(&self.pool)?;
        let session = conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                params![id],
                Self::row_to_session,
            )
            .optional()?;
        Ok(session)
    }

    /// Get session by content session id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_session_by_content_id(&self, content_session_id: &str) -> Result<Option<Session>> {
        let conn = get_conn(&self.pool)?;
        let session = conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE content_session_id = ?1"),
                params![content_session_id],
                Self::row_to_session,
            )
            .optional()?;
        Ok(session)
    }

    /// Record the memory-side session id. Returns whether a row changed.
    ///
    /// # Errors
    /// Returns error if database update fails.
    pub fn set_memory_session_id(
        &self,
        content_session_id: &str,
        memory_session_id: &str,
    ) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let changed = conn.execute(
            "UPDATE sessions SET memory_session_id = ?2 WHERE content_session_id = ?1",
            params![content_session_id, memory_session_id],
        )?;
        Ok(changed > 0)
    }

    /// Move an active session to `completed`. Returns whether a transition happened.
    ///
    /// # Errors
    /// Returns error if database update fails.
    pub fn complete_session(&self, content_session_id: &str) -> Result<bool> {
        self.finish_session(content_session_id, SessionStatus::Completed)
    }

    /// Move an active session to `failed`. Returns whether a transition happened.
    ///
    /// # Errors
    /// Returns error if database update fails.
    pub fn fail_session(&self, content_session_id: &str) -> Result<bool> {
        self.finish_session(content_session_id, SessionStatus::Failed)
    }

    fn finish_session(&self, content_session_id: &str, status: SessionStatus) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now();
        let changed = conn.execute(
            "UPDATE sessions SET status = ?2, completed_at = ?3, completed_at_epoch = ?4
               WHERE content_session_id = ?1 AND status = 'active'",
            params![content_session_id, status.as_str(), now.to_rfc3339(), now.timestamp_millis()],
        )?;
        if changed > 0 {
            tracing::debug!(content_session_id, %status, "Session finished");
        }
        Ok(changed > 0)
    }

    /// Newest sessions of a project.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_project_sessions(&self, project: &str, limit: usize) -> Result<Vec<Session>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
               WHERE project = ?1 ORDER BY started_at_epoch DESC, id DESC LIMIT ?2"
        ))?;
        let results = stmt
            .query_map(params![project, limit as i64], Self::row_to_session)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
        let status: String = row.get(5)?;
        let status = status.parse::<SessionStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let completed_at: Option<String> = row.get(8)?;
        Ok(Session {
            id: row.get(0)?,
            content_session_id: row.get(1)?,
            project: row.get(2)?,
            user_prompt: row.get(3)?,
            memory_session_id: row.get(4)?,
            status,
            started_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
            started_at_epoch: row.get(7)?,
            completed_at: completed_at.map(|s| parse_timestamp(8, &s)).transpose()?,
            completed_at_epoch: row.get(9)?,
        })
    }
}
