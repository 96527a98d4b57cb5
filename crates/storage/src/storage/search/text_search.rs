//! Full-text search over observations and summaries (FTS5), with a literal
//! substring fallback when the index cannot serve the query.

use agentmem_core::{
    FTS_MAX_QUERY_CHARS, LexicalHit, SearchFilters, SummaryHit, truncate_chars,
};
use rusqlite::{Connection, ToSql};

use crate::error::Result;
use crate::storage::observations::OBSERVATION_COLUMNS;
use crate::storage::summaries::SUMMARY_COLUMNS;
use crate::storage::{Storage, build_fts_query, coerce_to_sql, get_conn, log_row_error};

/// SQL conditions and bound values for the non-text filters.
fn filter_conditions(
    filters: &SearchFilters,
    alias: &str,
    with_type: bool,
) -> (Vec<String>, Vec<Box<dyn ToSql>>) {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(p) = &filters.project {
        conditions.push(format!("{alias}.project = ?"));
        params.push(Box::new(p.clone()));
    }
    if with_type && let Some(t) = filters.observation_type {
        conditions.push(format!("{alias}.observation_type = ?"));
        params.push(Box::new(t.as_str()));
    }
    if let Some(start) = filters.start_epoch {
        conditions.push(format!("{alias}.created_at_epoch >= ?"));
        params.push(Box::new(start));
    }
    if let Some(end) = filters.end_epoch {
        conditions.push(format!("{alias}.created_at_epoch <= ?"));
        params.push(Box::new(end));
    }
    (conditions, params)
}

fn and_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("AND {}", conditions.join(" AND "))
    }
}

/// `instr` match of `?` against each column; `%`, `_` and `*` carry no meaning.
fn substring_clause(alias: &str, columns: &[&str]) -> String {
    let parts: Vec<String> =
        columns.iter().map(|c| format!("instr(COALESCE({alias}.{c}, ''), ?) > 0")).collect();
    format!("({})", parts.join(" OR "))
}

const OBSERVATION_TEXT_COLUMNS: &[&str] = &["title", "text", "narrative", "concepts"];
const SUMMARY_TEXT_COLUMNS: &[&str] =
    &["request", "investigated", "learned", "completed", "next_steps", "notes"];

impl Storage {
    /// Full-text search over observations, ordered by bm25 ascending.
    ///
    /// An empty or whitespace-only query returns no hits. If the index
    /// rejects the query or is missing, falls back to a case-sensitive
    /// substring match ordered by recency; those hits carry no rank.
    ///
    /// # Errors
    /// Returns error only if both the index query and the fallback fail.
    pub fn search_observations(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<LexicalHit>> {
        let Some(fts_query) = build_fts_query(query) else {
            return Ok(Vec::new());
        };
        let conn = get_conn(&self.pool)?;
        match fts_observations(&conn, &fts_query, filters) {
            Ok(hits) => Ok(hits),
            Err(e) => {
                tracing::warn!(error = %e, "FTS query failed, falling back to substring search");
                substring_observations(&conn, query, filters)
            },
        }
    }

    /// Full-text search over session summaries, with the same fallback as
    /// [`Storage::search_observations`]. The type filter does not apply.
    ///
    /// # Errors
    /// Returns error only if both the index query and the fallback fail.
    pub fn search_summaries(&self, query: &str, filters: &SearchFilters) -> Result<Vec<SummaryHit>> {
        let Some(fts_query) = build_fts_query(query) else {
            return Ok(Vec::new());
        };
        let conn = get_conn(&self.pool)?;
        match fts_summaries(&conn, &fts_query, filters) {
            Ok(hits) => Ok(hits),
            Err(e) => {
                tracing::warn!(error = %e, "Summary FTS query failed, falling back to substring search");
                substring_summaries(&conn, query, filters)
            },
        }
    }
}

fn fts_observations(
    conn: &Connection,
    fts_query: &str,
    filters: &SearchFilters,
) -> rusqlite::Result<Vec<LexicalHit>> {
    let (conditions, params) = filter_conditions(filters, "o", true);
    let sql = format!(
        "SELECT {OBSERVATION_COLUMNS}, bm25(observations_fts) AS fts_rank
           FROM observations_fts f
           JOIN observations o ON o.id = f.rowid
           WHERE observations_fts MATCH ? {}
           ORDER BY fts_rank ASC, o.id DESC
           LIMIT ?",
        and_clause(&conditions)
    );
    let limit = filters.limit as i64;
    let mut all_params: Vec<&dyn ToSql> = vec![coerce_to_sql(&fts_query)];
    for p in &params {
        all_params.push(p.as_ref());
    }
    all_params.push(&limit);

    let mut stmt = conn.prepare(&sql)?;
    // Collect strictly: a MATCH error surfaces on the first step and must
    // reach the caller so it can fall back.
    stmt.query_map(all_params.as_slice(), |row| {
        Ok(LexicalHit { observation: Storage::row_to_observation(row)?, rank: Some(row.get(17)?) })
    })?
    .collect()
}

fn substring_observations(
    conn: &Connection,
    query: &str,
    filters: &SearchFilters,
) -> Result<Vec<LexicalHit>> {
    let needle = truncate_chars(query.trim(), FTS_MAX_QUERY_CHARS).to_owned();
    let (conditions, params) = filter_conditions(filters, "o", true);
    let sql = format!(
        "SELECT {OBSERVATION_COLUMNS} FROM observations o
           WHERE {} {}
           ORDER BY o.created_at_epoch DESC, o.id DESC
           LIMIT ?",
        substring_clause("o", OBSERVATION_TEXT_COLUMNS),
        and_clause(&conditions)
    );
    let limit = filters.limit as i64;
    let mut all_params: Vec<&dyn ToSql> =
        OBSERVATION_TEXT_COLUMNS.iter().map(|_| coerce_to_sql(&needle)).collect();
    for p in &params {
        all_params.push(p.as_ref());
    }
    all_params.push(&limit);

    let mut stmt = conn.prepare(&sql)?;
    let hits = stmt
        .query_map(all_params.as_slice(), |row| {
            Ok(LexicalHit { observation: Storage::row_to_observation(row)?, rank: None })
        })?
        .filter_map(log_row_error)
        .collect();
    Ok(hits)
}

fn fts_summaries(
    conn: &Connection,
    fts_query: &str,
    filters: &SearchFilters,
) -> rusqlite::Result<Vec<SummaryHit>> {
    let (conditions, params) = filter_conditions(filters, "s", false);
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS}, bm25(summaries_fts) AS fts_rank
           FROM summaries_fts f
           JOIN session_summaries s ON s.id = f.rowid
           WHERE summaries_fts MATCH ? {}
           ORDER BY fts_rank ASC, s.id DESC
           LIMIT ?",
        and_clause(&conditions)
    );
    let limit = filters.limit as i64;
    let mut all_params: Vec<&dyn ToSql> = vec![coerce_to_sql(&fts_query)];
    for p in &params {
        all_params.push(p.as_ref());
    }
    all_params.push(&limit);

    let mut stmt = conn.prepare(&sql)?;
    stmt.query_map(all_params.as_slice(), |row| {
        Ok(SummaryHit { summary: Storage::row_to_summary(row)?, rank: Some(row.get(12)?) })
    })?
    .collect()
}

fn substring_summaries(
    conn: &Connection,
    query: &str,
    filters: &SearchFilters,
) -> Result<Vec<SummaryHit>> {
    let needle = truncate_chars(query.trim(), FTS_MAX_QUERY_CHARS).to_owned();
    let (conditions, params) = filter_conditions(filters, "s", false);
    let sql = format!(
        "SELECT {SUMMARY_COLUMNS} FROM session_summaries s
           WHERE {} {}
           ORDER BY s.created_at_epoch DESC, s.id DESC
           LIMIT ?",
        substring_clause("s", SUMMARY_TEXT_COLUMNS),
        and_clause(&conditions)
    );
    let limit = filters.limit as i64;
    let mut all_params: Vec<&dyn ToSql> =
        SUMMARY_TEXT_COLUMNS.iter().map(|_| coerce_to_sql(&needle)).collect();
    for p in &params {
        all_params.push(p.as_ref());
    }
    all_params.push(&limit);

    let mut stmt = conn.prepare(&sql)?;
    let hits = stmt
        .query_map(all_params.as_slice(), |row| {
            Ok(SummaryHit { summary: Storage::row_to_summary(row)?, rank: None })
        })?
        .filter_map(log_row_error)
        .collect();
    Ok(hits)
}
