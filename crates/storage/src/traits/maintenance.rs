use agentmem_core::{ConsolidationReport, Observation};
use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage::ConsolidationOptions;

/// Background maintenance writes.
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    /// Stamp `last_accessed_epoch` on observations returned by a search.
    async fn touch_observations(&self, ids: &[i64], epoch_ms: i64) -> Result<usize, StorageError>;

    /// Flag observations whose files changed on disk.
    async fn mark_stale(&self, ids: &[i64]) -> Result<usize, StorageError>;

    /// Non-stale observations that reference files.
    async fn get_fresh_observations_with_files(&self) -> Result<Vec<Observation>, StorageError>;

    /// Merge near-duplicate observation groups.
    async fn consolidate_observations(
        &self,
        options: ConsolidationOptions,
    ) -> Result<ConsolidationReport, StorageError>;
}
