use agentmem_core::{NewObservation, Observation, ObservationType, PaginatedResult};
use rusqlite::{Row, params, params_from_iter};

use super::{
    Storage, coerce_to_sql, escape_like_pattern, get_conn, log_row_error, parse_json,
    parse_timestamp, placeholders,
};
use crate::error::Result;

/// Column list matching [`Storage::row_to_observation`]; expects alias `o`.
pub(crate) const OBSERVATION_COLUMNS: &str = "o.id, o.session_id, o.project, o.observation_type, \
     o.title, o.subtitle, o.text, o.narrative, o.facts, o.concepts, o.files_read, \
     o.files_modified, o.prompt_number, o.created_at, o.created_at_epoch, \
     o.last_accessed_epoch, o.is_stale";

impl Storage {
    /// Insert an observation and return its id. The full-text index is
    /// updated by trigger inside the same statement.
    ///
    /// # Errors
    /// Returns error if serialization or the insert fails.
    pub fn create_observation(&self, obs: &NewObservation) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO observations
               (session_id, project, observation_type, title, subtitle, text, narrative,
                facts, concepts, files_read, files_modified, prompt_number,
                created_at, created_at_epoch)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                obs.session_id,
                obs.project,
                obs.observation_type.as_str(),
                obs.title,
                obs.subtitle,
                obs.text,
                obs.narrative,
                serde_json::to_string(&obs.facts)?,
                serde_json::to_string(&obs.concepts)?,
                serde_json::to_string(&obs.files_read)?,
                serde_json::to_string(&obs.files_modified)?,
                obs.prompt_number,
                obs.created_at.to_rfc3339(),
                obs.created_at_epoch(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, project = %obs.project, "Observation created");
        Ok(id)
    }

    /// Get observation by id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_observation(&self, id: i64) -> Result<Option<Observation>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn
            .prepare(&format!("SELECT {OBSERVATION_COLUMNS} FROM observations o WHERE o.id = ?1"))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::row_to_observation(row)?)),
            None => Ok(None),
        }
    }

    /// Get observations by ids, newest first. Unknown ids are skipped.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_observations_by_ids(&self, ids: &[i64]) -> Result<Vec<Observation>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = get_conn(&self.pool)?;
        let sql = format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o WHERE o.id IN ({})
               ORDER BY o.created_at_epoch DESC, o.id DESC",
            placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt
            .query_map(params_from_iter(ids.iter()), Self::row_to_observation)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// All observations of a session ordered by prompt number, then id.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_session_observations(&self, session_id: &str) -> Result<Vec<Observation>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o
               WHERE o.session_id = ?1 ORDER BY o.prompt_number ASC, o.id ASC"
        ))?;
        let results = stmt
            .query_map(params![session_id], Self::row_to_observation)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// Most recent observations, optionally scoped to one project.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_recent_observations(
        &self,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Observation>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o
               WHERE (?1 IS NULL OR o.project = ?1)
               ORDER BY o.created_at_epoch DESC, o.id DESC LIMIT ?2"
        ))?;
        let results = stmt
            .query_map(params![project, limit as i64], Self::row_to_observation)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// Newest observations of a project.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_project_observations(
        &self,
        project: &str,
        limit: usize,
    ) -> Result<Vec<Observation>> {
        self.get_recent_observations(Some(project), limit)
    }

    /// Page through observations newest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_observations(
        &self,
        project: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Observation>> {
        let conn = get_conn(&self.pool)?;
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM observations WHERE (?1 IS NULL OR project = ?1)",
            params![project],
            |row| row.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o
               WHERE (?1 IS NULL OR o.project = ?1)
               ORDER BY o.created_at_epoch DESC, o.id DESC LIMIT ?2 OFFSET ?3"
        ))?;
        let items = stmt
            .query_map(params![project, limit as i64, offset as i64], Self::row_to_observation)?
            .filter_map(log_row_error)
            .collect();
        Ok(PaginatedResult { items, total: total as u64, offset, limit })
    }

    /// Observations whose read or modified file lists contain an entry
    /// matching `file_path` as a substring, newest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn search_by_file(
        &self,
        file_path: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Observation>> {
        let conn = get_conn(&self.pool)?;
        let pattern = format!("%{}%", escape_like_pattern(file_path));
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o
               WHERE (?2 IS NULL OR o.project = ?2)
                 AND (EXISTS (SELECT 1 FROM json_each(o.files_modified) WHERE value LIKE ?1 ESCAPE '\\')
                   OR EXISTS (SELECT 1 FROM json_each(o.files_read) WHERE value LIKE ?1 ESCAPE '\\'))
               ORDER BY o.created_at_epoch DESC, o.id DESC LIMIT ?3"
        ))?;
        let results = stmt
            .query_map(params![pattern, project, limit as i64], Self::row_to_observation)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// Distinct project names across observations, summaries and sessions.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT project FROM observations
             UNION SELECT project FROM session_summaries
             UNION SELECT project FROM sessions
             ORDER BY project",
        )?;
        let projects = stmt.query_map([], |row| row.get(0))?.filter_map(log_row_error).collect();
        Ok(projects)
    }

    /// Observation rows filtered by type and creation window, newest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_filtered_observations(
        &self,
        project: Option<&str>,
        observation_type: Option<ObservationType>,
        start_epoch: Option<i64>,
        end_epoch: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Observation>> {
        let conn = get_conn(&self.pool)?;
        let obs_type = observation_type.map(|t| t.as_str());
        let sql = format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o
               WHERE (?1 IS NULL OR o.project = ?1)
                 AND (?2 IS NULL OR o.observation_type = ?2)
                 AND (?3 IS NULL OR o.created_at_epoch >= ?3)
                 AND (?4 IS NULL OR o.created_at_epoch <= ?4)
               ORDER BY o.created_at_epoch DESC, o.id DESC LIMIT ?5"
        );
        let limit = limit as i64;
        let args = [
            coerce_to_sql(&project),
            coerce_to_sql(&obs_type),
            coerce_to_sql(&start_epoch),
            coerce_to_sql(&end_epoch),
            coerce_to_sql(&limit),
        ];
        let mut stmt = conn.prepare(&sql)?;
        let results = stmt
            .query_map(args.as_slice(), Self::row_to_observation)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// Map a row selected with [`OBSERVATION_COLUMNS`].
    pub(crate) fn row_to_observation(row: &Row<'_>) -> rusqlite::Result<Observation> {
        let type_str: String = row.get(3)?;
        let observation_type = type_str.parse::<ObservationType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Observation {
            id: row.get(0)?,
            session_id: row.get(1)?,
            project: row.get(2)?,
            observation_type,
            title: row.get(4)?,
            subtitle: row.get(5)?,
            text: row.get(6)?,
            narrative: row.get(7)?,
            facts: parse_json(&row.get::<_, String>(8)?)?,
            concepts: parse_json(&row.get::<_, String>(9)?)?,
            files_read: parse_json(&row.get::<_, String>(10)?)?,
            files_modified: parse_json(&row.get::<_, String>(11)?)?,
            prompt_number: row.get(12)?,
            created_at: parse_timestamp(13, &row.get::<_, String>(13)?)?,
            created_at_epoch: row.get(14)?,
            last_accessed_epoch: row.get(15)?,
            is_stale: row.get(16)?,
        })
    }
}
