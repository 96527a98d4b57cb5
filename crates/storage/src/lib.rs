//! Storage layer for agentmem
//!
//! `SQLite` (bundled) behind an r2d2 pool: numbered migrations, FTS5
//! indexes kept in sync by triggers, and embedding blobs searched by a
//! linear cosine scan.

mod error;
mod migrations;
mod sqlite_async;
mod storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use error::{Result, StorageError};
pub use migrations::{MigrationMode, SCHEMA_VERSION};
pub use storage::{ConsolidationOptions, DEFAULT_POOL_SIZE, Storage};
pub use traits::StorageBackend;
