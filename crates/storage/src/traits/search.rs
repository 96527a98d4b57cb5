use agentmem_core::{
    LexicalHit, Observation, ObservationType, ProjectStats, SearchFilters, StorageStats,
    SummaryHit, Timeline,
};
use async_trait::async_trait;

use crate::error::StorageError;

/// Lexical search and chronological queries.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Full-text search over observations; raw bm25 rank per hit.
    async fn search_observations(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<LexicalHit>, StorageError>;

    /// Full-text search over summaries.
    async fn search_summaries(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SummaryHit>, StorageError>;

    /// Observations by type and creation window, newest first.
    async fn list_filtered_observations(
        &self,
        project: Option<&str>,
        observation_type: Option<ObservationType>,
        start_epoch: Option<i64>,
        end_epoch: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError>;

    /// Window of observations around an anchor.
    async fn get_timeline(
        &self,
        anchor_id: i64,
        before: usize,
        after: usize,
    ) -> Result<Option<Timeline>, StorageError>;
}

/// Statistics queries.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn get_stats(&self) -> Result<StorageStats, StorageError>;

    async fn get_project_stats(&self, project: &str) -> Result<ProjectStats, StorageError>;
}
