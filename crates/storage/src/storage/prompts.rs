use agentmem_core::{NewUserPrompt, UserPrompt};
use chrono::Utc;
use rusqlite::{Row, params};

use super::{Storage, escape_like_pattern, get_conn, log_row_error, parse_timestamp};
use crate::error::Result;

const PROMPT_COLUMNS: &str =
    "id, session_id, project, prompt_number, prompt_text, created_at, created_at_epoch";

impl Storage {
    /// Append a user prompt and return its id.
    ///
    /// # Errors
    /// Returns error if database insert fails.
    pub fn save_user_prompt(&self, prompt: &NewUserPrompt) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO user_prompts
               (session_id, project, prompt_number, prompt_text, created_at, created_at_epoch)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                prompt.session_id,
                prompt.project,
                prompt.prompt_number,
                prompt.prompt_text,
                now.to_rfc3339(),
                now.timestamp_millis(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Prompts of a session in prompt order.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_session_prompts(&self, session_id: &str) -> Result<Vec<UserPrompt>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROMPT_COLUMNS} FROM user_prompts
               WHERE session_id = ?1 ORDER BY prompt_number ASC, id ASC"
        ))?;
        let results = stmt
            .query_map(params![session_id], Self::row_to_prompt)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// Number of prompts recorded for a session.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn count_session_prompts(&self, session_id: &str) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM user_prompts WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Case-insensitive substring search over prompt text, newest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn search_prompts(
        &self,
        query: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<UserPrompt>> {
        let conn = get_conn(&self.pool)?;
        let pattern = format!("%{}%", escape_like_pattern(query));
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROMPT_COLUMNS} FROM user_prompts
               WHERE prompt_text LIKE ?1 ESCAPE '\\' AND (?2 IS NULL OR project = ?2)
               ORDER BY created_at_epoch DESC, id DESC LIMIT ?3"
        ))?;
        let results = stmt
            .query_map(params![pattern, project, limit as i64], Self::row_to_prompt)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    fn row_to_prompt(row: &Row<'_>) -> rusqlite::Result<UserPrompt> {
        Ok(UserPrompt {
            id: row.get(0)?,
            session_id: row.get(1)?,
            project: row.get(2)?,
            prompt_number: row.get(3)?,
            prompt_text: row.get(4)?,
            created_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
            created_at_epoch: row.get(6)?,
        })
    }
}
