//! Migration v5: access tracking and staleness flag
//!
//! Columns are added through `add_column_if_not_exists`; only the indexes
//! are a raw SQL batch.

pub(super) const LAST_ACCESSED: (&str, &str) = ("last_accessed_epoch", "INTEGER");
pub(super) const IS_STALE: (&str, &str) = ("is_stale", "INTEGER NOT NULL DEFAULT 0");

pub(super) const INDEX_SQL: &str = "
CREATE INDEX IF NOT EXISTS idx_observations_accessed ON observations(last_accessed_epoch);
CREATE INDEX IF NOT EXISTS idx_observations_stale ON observations(is_stale);
";
