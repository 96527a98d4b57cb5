use agentmem_core::ProjectAlias;
use chrono::Utc;
use rusqlite::{OptionalExtension as _, Row, params};

use super::{Storage, get_conn, log_row_error, parse_timestamp};
use crate::error::Result;

impl Storage {
    /// Set the display name of a project, keeping the original `created_at`.
    ///
    /// # Errors
    /// Returns error if database upsert fails.
    pub fn upsert_project_alias(&self, project_name: &str, display_name: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO project_aliases (project_name, display_name, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?3)
               ON CONFLICT(project_name) DO UPDATE SET
                 display_name = excluded.display_name,
                 updated_at = excluded.updated_at",
            params![project_name, display_name, now],
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn get_project_alias(&self, project_name: &str) -> Result<Option<ProjectAlias>> {
        let conn = get_conn(&self.pool)?;
        let alias = conn
            .query_row(
                "SELECT project_name, display_name, created_at, updated_at
                   FROM project_aliases WHERE project_name = ?1",
                params![project_name],
                Self::row_to_alias,
            )
            .optional()?;
        Ok(alias)
    }

    /// # Errors
    /// Returns error if database query fails.
    pub fn list_project_aliases(&self) -> Result<Vec<ProjectAlias>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT project_name, display_name, created_at, updated_at
               FROM project_aliases ORDER BY project_name",
        )?;
        let results = stmt.query_map([], Self::row_to_alias)?.filter_map(log_row_error).collect();
        Ok(results)
    }

    fn row_to_alias(row: &Row<'_>) -> rusqlite::Result<ProjectAlias> {
        Ok(ProjectAlias {
            project_name: row.get(0)?,
            display_name: row.get(1)?,
            created_at: parse_timestamp(2, &row.get::<_, String>(2)?)?,
            updated_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
        })
    }
}
