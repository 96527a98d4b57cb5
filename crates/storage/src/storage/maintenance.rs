//! Access tracking, staleness flags and duplicate consolidation.

use std::collections::BTreeMap;

use agentmem_core::{
    CONSOLIDATION_DELIMITER, ConsolidationReport, DEFAULT_CONSOLIDATION_MIN_GROUP,
    MAX_OBSERVATION_TEXT_BYTES, Observation, ObservationType, truncate_bytes,
};
use rusqlite::{Transaction, params, params_from_iter};

use super::observations::OBSERVATION_COLUMNS;
use super::{Storage, get_conn, log_row_error, placeholders};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsolidationOptions {
    /// Smallest group that gets merged; values below 2 are treated as 2.
    pub min_group_size: usize,
    /// Report what would happen without writing.
    pub dry_run: bool,
}

impl Default for ConsolidationOptions {
    fn default() -> Self {
        Self { min_group_size: DEFAULT_CONSOLIDATION_MIN_GROUP, dry_run: false }
    }
}

type GroupKey = (String, ObservationType, Vec<String>);

/// Groups of at least `min_group_size` observations sharing project, type
/// and canonical modified-file list. Each group is sorted newest first, so
/// the survivor is element 0. Observations without modified files never group.
pub(crate) fn consolidation_groups(
    observations: Vec<Observation>,
    min_group_size: usize,
) -> Vec<Vec<Observation>> {
    let mut groups: BTreeMap<GroupKey, Vec<Observation>> = BTreeMap::new();
    for obs in observations {
        let files = obs.canonical_files_modified();
        if files.is_empty() {
            continue;
        }
        groups.entry((obs.project.clone(), obs.observation_type, files)).or_default().push(obs);
    }
    groups
        .into_values()
        .filter(|g| g.len() >= min_group_size.max(2))
        .map(|mut g| {
            g.sort_by(|a, b| {
                b.created_at_epoch.cmp(&a.created_at_epoch).then_with(|| b.id.cmp(&a.id))
            });
            g
        })
        .collect()
}

/// Title with any trailing ` (xN)` count split off; plain titles count as 1.
fn split_count(title: &str) -> (&str, usize) {
    let trimmed = title.trim_end();
    if let Some(start) = trimmed.rfind(" (x")
        && let Some(digits) = trimmed[start + 3..].strip_suffix(')')
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && let Ok(count) = digits.parse::<usize>()
        && count > 0
    {
        return (&trimmed[..start], count);
    }
    (trimmed, 1)
}

/// Survivor's base title suffixed with how many original rows the group
/// represents, counting rows that were themselves earlier merges.
pub(crate) fn merged_title(group: &[Observation]) -> String {
    let total: usize = group.iter().map(|o| split_count(&o.title).1).sum();
    let base = group.first().map_or("", |o| split_count(&o.title).0);
    format!("{base} (x{total})")
}

/// Distinct non-empty text bodies joined by the consolidation delimiter,
/// survivor first, capped on a char boundary.
pub(crate) fn merged_text(group: &[Observation]) -> Option<String> {
    let mut bodies: Vec<&str> = Vec::new();
    for body in group.iter().filter_map(|o| o.text.as_deref()).map(str::trim) {
        if !body.is_empty() && !bodies.contains(&body) {
            bodies.push(body);
        }
    }
    if bodies.is_empty() {
        return None;
    }
    let joined = bodies.join(CONSOLIDATION_DELIMITER);
    Some(truncate_bytes(&joined, MAX_OBSERVATION_TEXT_BYTES).to_owned())
}

fn merge_group(tx: &Transaction<'_>, group: &[Observation]) -> rusqlite::Result<usize> {
    let Some((survivor, rest)) = group.split_first() else {
        return Ok(0);
    };
    tx.execute(
        "UPDATE observations SET title = ?2, text = ?3 WHERE id = ?1",
        params![survivor.id, merged_title(group), merged_text(group)],
    )?;
    let ids: Vec<i64> = rest.iter().map(|o| o.id).collect();
    let removed = tx.execute(
        &format!("DELETE FROM observations WHERE id IN ({})", placeholders(ids.len())),
        params_from_iter(ids.iter()),
    )?;
    // Merged text changed; the next backfill re-embeds it.
    tx.execute(
        "DELETE FROM observation_embeddings WHERE observation_id = ?1",
        params![survivor.id],
    )?;
    Ok(removed)
}

impl Storage {
    /// Set `last_accessed_epoch` on the given observations.
    ///
    /// # Errors
    /// Returns error if database update fails.
    pub fn touch_observations(&self, ids: &[i64], epoch_ms: i64) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = get_conn(&self.pool)?;
        let sql = format!(
            "UPDATE observations SET last_accessed_epoch = ? WHERE id IN ({})",
            placeholders(ids.len())
        );
        let args = std::iter::once(epoch_ms).chain(ids.iter().copied());
        Ok(conn.execute(&sql, params_from_iter(args))?)
    }

    /// Flag observations as stale. Already-stale rows are not counted.
    ///
    /// # Errors
    /// Returns error if database update fails.
    pub fn mark_stale(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = get_conn(&self.pool)?;
        let sql = format!(
            "UPDATE observations SET is_stale = 1 WHERE is_stale = 0 AND id IN ({})",
            placeholders(ids.len())
        );
        Ok(conn.execute(&sql, params_from_iter(ids.iter()))?)
    }

    /// Non-stale observations with at least one modified file.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_fresh_observations_with_files(&self) -> Result<Vec<Observation>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations o
               WHERE o.is_stale = 0
                 AND json_array_length(o.files_modified) > 0
               ORDER BY o.id ASC"
        ))?;
        let results = stmt.query_map([], Self::row_to_observation)?.filter_map(log_row_error).collect();
        Ok(results)
    }

    /// Merge groups of near-duplicate observations into their newest member.
    ///
    /// Each group is merged in its own transaction. A group that fails is
    /// rolled back, counted in `failed`, and the run continues.
    ///
    /// # Errors
    /// Returns error if the candidate rows cannot be read.
    pub fn consolidate_observations(
        &self,
        options: ConsolidationOptions,
    ) -> Result<ConsolidationReport> {
        let candidates = {
            let conn = get_conn(&self.pool)?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {OBSERVATION_COLUMNS} FROM observations o
                   WHERE json_array_length(o.files_modified) > 0"
            ))?;
            let rows: Vec<Observation> =
                stmt.query_map([], Self::row_to_observation)?.filter_map(log_row_error).collect();
            rows
        };

        let groups = consolidation_groups(candidates, options.min_group_size);
        let mut report = ConsolidationReport { groups: groups.len(), ..Default::default() };

        if options.dry_run {
            report.merged = groups.len();
            report.removed = groups.iter().map(|g| g.len() - 1).sum();
            tracing::info!(?report, "Consolidation dry run");
            return Ok(report);
        }

        let mut conn = get_conn(&self.pool)?;
        for group in &groups {
            let survivor_id = group.first().map_or(0, |o| o.id);
            let outcome = conn.transaction().and_then(|tx| {
                let removed = merge_group(&tx, group)?;
                tx.commit()?;
                Ok(removed)
            });
            match outcome {
                Ok(removed) => {
                    report.merged += 1;
                    report.removed += removed;
                    tracing::debug!(survivor_id, removed, "Merged observation group");
                },
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(survivor_id, error = %e, "Failed to merge observation group");
                },
            }
        }

        tracing::info!(?report, "Consolidation finished");
        Ok(report)
    }
}
