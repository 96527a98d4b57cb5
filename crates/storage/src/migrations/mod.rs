//! Numbered, additive schema migrations tracked in a `schema_versions` ledger.
//!
//! Each pending migration runs in one `IMMEDIATE` transaction together with
//! its ledger row, so a failure leaves the recorded version where it was and
//! concurrent openers serialize on the write lock instead of racing.

#![allow(
    clippy::redundant_pub_crate,
    reason = "migrations module is private, pub(crate) is intentional"
)]

mod column_helpers;
mod v1;
mod v2;
mod v3;
mod v4;
mod v5;

use chrono::Utc;
use column_helpers::add_column_if_not_exists;
use rusqlite::{Connection, TransactionBehavior};

use crate::error::StorageError;

/// Highest migration version known to this build.
pub const SCHEMA_VERSION: i64 = 5;

/// Whether opening a store performs schema work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MigrationMode {
    /// Read the ledger version and apply anything pending.
    #[default]
    Auto,
    /// Open without touching the schema. Only for callers that know the
    /// store is already current.
    Skip,
}

struct Migration {
    version: i64,
    name: &'static str,
    apply: fn(&Connection) -> Result<(), rusqlite::Error>,
}

const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "core tables", apply: |c| c.execute_batch(v1::SQL) },
    Migration { version: 2, name: "full-text index", apply: |c| c.execute_batch(v2::SQL) },
    Migration { version: 3, name: "project aliases", apply: |c| c.execute_batch(v3::SQL) },
    Migration { version: 4, name: "observation embeddings", apply: |c| c.execute_batch(v4::SQL) },
    Migration { version: 5, name: "access and staleness columns", apply: apply_v5 },
];

fn apply_v5(conn: &Connection) -> Result<(), rusqlite::Error> {
    add_column_if_not_exists(conn, "observations", v5::LAST_ACCESSED.0, v5::LAST_ACCESSED.1)?;
    add_column_if_not_exists(conn, "observations", v5::IS_STALE.0, v5::IS_STALE.1)?;
    conn.execute_batch(v5::INDEX_SQL)
}

const LEDGER_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_versions (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
";

/// Highest applied version, or 0 for a fresh database.
pub(crate) fn current_version(conn: &Connection) -> Result<i64, rusqlite::Error> {
    conn.execute_batch(LEDGER_SQL)?;
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_versions", [], |row| row.get(0))
}

/// Applies every migration newer than the ledger version. Returns how many ran.
pub(crate) fn run_migrations(conn: &mut Connection) -> Result<usize, StorageError> {
    let current = current_version(conn)?;
    if current >= SCHEMA_VERSION {
        tracing::debug!(version = current, "Database schema up to date");
        return Ok(0);
    }

    tracing::info!(current, target = SCHEMA_VERSION, "Migrating database schema");

    let mut applied = 0usize;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let wrap = |source| StorageError::Migration {
            version: migration.version,
            name: migration.name,
            source,
        };
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate).map_err(wrap)?;
        // Another connection may have applied it while we waited for the lock.
        let recorded: i64 = tx
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_versions", [], |row| {
                row.get(0)
            })
            .map_err(wrap)?;
        if recorded >= migration.version {
            tracing::debug!(version = migration.version, "Migration already applied");
            continue;
        }
        tracing::info!(version = migration.version, name = migration.name, "Running migration");
        (migration.apply)(&tx).map_err(wrap)?;
        tx.execute(
            "INSERT INTO schema_versions (version, name, applied_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![migration.version, migration.name, Utc::now().to_rfc3339()],
        )
        .map_err(wrap)?;
        tx.commit().map_err(wrap)?;
        applied += 1;
    }

    tracing::info!(version = SCHEMA_VERSION, applied, "Database schema up to date");
    Ok(applied)
}
