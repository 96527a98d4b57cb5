use std::collections::BTreeMap;

use agentmem_core::{ProjectStats, StorageStats};
use rusqlite::params;

use super::{Storage, get_conn, log_row_error};
use crate::error::Result;

impl Storage {
    /// Row counts across the whole store.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_stats(&self) -> Result<StorageStats> {
        let conn = get_conn(&self.pool)?;
        let stats = conn.query_row(
            "SELECT
               (SELECT COUNT(*) FROM observations),
               (SELECT COUNT(*) FROM session_summaries),
               (SELECT COUNT(*) FROM user_prompts),
               (SELECT COUNT(*) FROM sessions),
               (SELECT COUNT(*) FROM (SELECT project FROM observations
                                      UNION SELECT project FROM session_summaries
                                      UNION SELECT project FROM sessions)),
               (SELECT COUNT(*) FROM observation_embeddings)",
            [],
            |row| {
                Ok(StorageStats {
                    observations: row.get::<_, i64>(0)? as u64,
                    summaries: row.get::<_, i64>(1)? as u64,
                    prompts: row.get::<_, i64>(2)? as u64,
                    sessions: row.get::<_, i64>(3)? as u64,
                    projects: row.get::<_, i64>(4)? as u64,
                    embeddings: row.get::<_, i64>(5)? as u64,
                })
            },
        )?;
        Ok(stats)
    }

    /// Counts for one project. An unknown project yields all zeros.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_project_stats(&self, project: &str) -> Result<ProjectStats> {
        let conn = get_conn(&self.pool)?;
        let mut stats = conn.query_row(
            "SELECT
               (SELECT COUNT(*) FROM observations WHERE project = ?1),
               (SELECT COUNT(*) FROM session_summaries WHERE project = ?1),
               (SELECT COUNT(*) FROM user_prompts WHERE project = ?1),
               (SELECT COUNT(*) FROM sessions WHERE project = ?1),
               (SELECT COUNT(*) FROM observation_embeddings e
                  JOIN observations o ON o.id = e.observation_id WHERE o.project = ?1),
               (SELECT COUNT(*) FROM observations WHERE project = ?1 AND is_stale = 1),
               (SELECT MIN(created_at_epoch) FROM observations WHERE project = ?1),
               (SELECT MAX(created_at_epoch) FROM observations WHERE project = ?1)",
            params![project],
            |row| {
                Ok(ProjectStats {
                    project: project.to_owned(),
                    observations: row.get::<_, i64>(0)? as u64,
                    summaries: row.get::<_, i64>(1)? as u64,
                    prompts: row.get::<_, i64>(2)? as u64,
                    sessions: row.get::<_, i64>(3)? as u64,
                    embedded: row.get::<_, i64>(4)? as u64,
                    stale: row.get::<_, i64>(5)? as u64,
                    by_type: BTreeMap::new(),
                    first_epoch: row.get(6)?,
                    last_epoch: row.get(7)?,
                })
            },
        )?;

        let mut stmt = conn.prepare(
            "SELECT observation_type, COUNT(*) FROM observations
               WHERE project = ?1 GROUP BY observation_type",
        )?;
        stats.by_type = stmt
            .query_map(params![project], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(stats)
    }

    /// `(total observations, observations with an embedding)`.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn embedding_counts(&self) -> Result<(u64, u64)> {
        let conn = get_conn(&self.pool)?;
        let counts = conn.query_row(
            "SELECT (SELECT COUNT(*) FROM observations),
                    (SELECT COUNT(*) FROM observation_embeddings)",
            [],
            |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, i64>(1)? as u64)),
        )?;
        Ok(counts)
    }
}
