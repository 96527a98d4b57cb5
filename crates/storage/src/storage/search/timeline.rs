//! Chronological window around an anchor observation

use agentmem_core::{Observation, Timeline};
use rusqlite::params;

use crate::error::Result;
use crate::storage::observations::OBSERVATION_COLUMNS;
use crate::storage::{Storage, get_conn, log_row_error};

impl Storage {
    /// Up to `before` older and `after` newer observations from the anchor's
    /// project, ordered by (creation epoch, id). `None` if the anchor is unknown.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_timeline(&self, anchor_id: i64, before: usize, after: usize) -> Result<Option<Timeline>> {
        let Some(anchor) = self.get_observation(anchor_id)? else {
            return Ok(None);
        };
        let conn = get_conn(&self.pool)?;

        let mut older_stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o
               WHERE o.project = ?1
                 AND (o.created_at_epoch < ?2 OR (o.created_at_epoch = ?2 AND o.id < ?3))
               ORDER BY o.created_at_epoch DESC, o.id DESC
               LIMIT ?4"
        ))?;
        let mut older: Vec<Observation> = older_stmt
            .query_map(
                params![anchor.project, anchor.created_at_epoch, anchor.id, before as i64],
                Self::row_to_observation,
            )?
            .filter_map(log_row_error)
            .collect();
        older.reverse();

        let mut newer_stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o
               WHERE o.project = ?1
                 AND (o.created_at_epoch > ?2 OR (o.created_at_epoch = ?2 AND o.id > ?3))
               ORDER BY o.created_at_epoch ASC, o.id ASC
               LIMIT ?4"
        ))?;
        let newer: Vec<Observation> = newer_stmt
            .query_map(
                params![anchor.project, anchor.created_at_epoch, anchor.id, after as i64],
                Self::row_to_observation,
            )?
            .filter_map(log_row_error)
            .collect();

        Ok(Some(Timeline { anchor, before: older, after: newer }))
    }
}
