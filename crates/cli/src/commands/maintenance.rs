use agentmem_core::MemoryConfig;
use agentmem_storage::{MigrationMode, SCHEMA_VERSION, Storage};
use anyhow::Result;

use super::print_json;

/// Open without the automatic version check so the applied count is visible.
pub(crate) fn run_migrate(config: &MemoryConfig) -> Result<()> {
    let storage = Storage::open(&config.db_path, config.db_pool_size, MigrationMode::Skip)?;
    let applied = storage.run_migrations()?;
    let version = storage.schema_version()?;
    tracing::info!(applied, version, db = %config.db_path.display(), "migrations complete");
    print_json(&serde_json::json!({
        "applied": applied,
        "schema_version": version,
        "latest": SCHEMA_VERSION,
    }))
}
