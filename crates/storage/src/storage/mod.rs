//! `SQLite` storage implementation
//!
//! All methods are synchronous; `crate::sqlite_async` lifts them onto the
//! tokio blocking pool.

// SQLite uses i64 for counts/limits, Rust uses usize - safe conversions within DB context
#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "SQLite i64 <-> Rust usize conversions are safe within DB row counts"
)]

mod aliases;
mod embeddings;
mod maintenance;
mod observations;
mod prompts;
mod search;
mod sessions;
mod stats;
mod summaries;

pub use maintenance::ConsolidationOptions;

use std::path::Path;

use agentmem_core::{FTS_MAX_QUERY_CHARS, FTS_MAX_TOKENS, MemoryConfig, truncate_chars};
use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::Result;
use crate::migrations::{self, MigrationMode};

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Main storage struct wrapping `SQLite` connection pool
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn> {
    Ok(pool.get()?)
}

/// Parse JSON from string, converting error to rusqlite error
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(s: &str) -> rusqlite::Result<T> {
    serde_json::from_str(s).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Parse an RFC 3339 column back into a UTC timestamp
pub(crate) fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Log row read errors and filter them out
pub(crate) fn log_row_error<T>(result: rusqlite::Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, "Row read error");
            None
        },
    }
}

/// Coerce a reference to `ToSql` trait object (avoids trivial cast lint)
pub(crate) fn coerce_to_sql<T: rusqlite::ToSql>(val: &T) -> &dyn rusqlite::ToSql {
    val
}

/// Escape special characters for LIKE pattern matching
pub(crate) fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Comma-separated `?` placeholders for an `IN (...)` list
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// Build an FTS5 query from whitespace-separated words.
///
/// Input is capped at 10,000 characters and 100 tokens. Quote characters
/// are stripped and every token is quoted, so FTS5 operators in user input
/// are matched literally. Tokens without a letter or digit (`-`, `/`) are
/// dropped since the tokenizer would turn them into empty phrases. Tokens
/// are joined with `AND`. Returns `None` when nothing searchable remains.
pub(crate) fn build_fts_query(query: &str) -> Option<String> {
    let capped = truncate_chars(query, FTS_MAX_QUERY_CHARS);
    let tokens: Vec<String> = capped
        .split_whitespace()
        .take(FTS_MAX_TOKENS)
        .map(|word| word.replace(['"', '\''], ""))
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .map(|word| format!("\"{word}\""))
        .collect();
    if tokens.is_empty() { None } else { Some(tokens.join(" AND ")) }
}

/// Per-connection pragmas for concurrency and referential integrity
fn init_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA busy_timeout = 30000;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;",
    )?;
    Ok(())
}

impl Storage {
    /// Open (creating if needed) the database at `db_path` with the default
    /// pool size, applying pending migrations.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or a migration fails.
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::open(db_path, DEFAULT_POOL_SIZE, MigrationMode::Auto)
    }

    /// Open using the path and pool size from configuration.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or a migration fails.
    pub fn from_config(config: &MemoryConfig) -> Result<Self> {
        Self::open(&config.db_path, config.db_pool_size, MigrationMode::Auto)
    }

    /// Open with an explicit pool size and migration mode.
    ///
    /// # Errors
    /// Returns error if the parent directory cannot be created, the pool
    /// cannot be built or a migration fails.
    pub fn open(db_path: &Path, pool_size: u32, mode: MigrationMode) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);
        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;

        let storage = Self { pool };
        if mode == MigrationMode::Auto {
            storage.run_migrations()?;
        }

        tracing::info!(
            path = %db_path.display(),
            pool_size,
            ?mode,
            "Storage initialized with connection pool"
        );
        Ok(storage)
    }

    /// Apply any pending migrations. Returns how many ran; 0 when current.
    ///
    /// # Errors
    /// Returns `StorageError::Migration` if a migration fails.
    pub fn run_migrations(&self) -> Result<usize> {
        let mut conn = get_conn(&self.pool)?;
        migrations::run_migrations(&mut conn)
    }

    /// Highest schema version recorded in the ledger.
    ///
    /// # Errors
    /// Returns error if the ledger cannot be read.
    pub fn schema_version(&self) -> Result<i64> {
        let conn = get_conn(&self.pool)?;
        Ok(migrations::current_version(&conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fts_query_quotes_tokens() {
        assert_eq!(build_fts_query("fix auth").as_deref(), Some("\"fix\" AND \"auth\""));
    }

    #[test]
    fn fts_query_strips_quotes_and_operators_stay_literal() {
        assert_eq!(
            build_fts_query("\"NEAR\" it's OR").as_deref(),
            Some("\"NEAR\" AND \"its\" AND \"OR\"")
        );
    }

    #[test]
    fn fts_query_empty_input_yields_none() {
        assert_eq!(build_fts_query(""), None);
        assert_eq!(build_fts_query("   \t "), None);
        assert_eq!(build_fts_query("\"\" ''"), None);
    }

    #[test]
    fn fts_query_drops_punctuation_only_tokens() {
        assert_eq!(
            build_fts_query("Fixed X - details / --").as_deref(),
            Some("\"Fixed\" AND \"X\" AND \"details\"")
        );
        assert_eq!(build_fts_query("- -- /"), None);
    }

    #[test]
    fn fts_query_caps_token_count() {
        let query = (0..150).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let built = build_fts_query(&query).unwrap();
        assert_eq!(built.matches(" AND ").count(), FTS_MAX_TOKENS - 1);
    }
}
