use std::sync::Arc;

use agentmem_core::validation::{clamp_limit, validate_ids, validate_project};
use agentmem_core::{
    ContextBundle, DEFAULT_CONTEXT_LIMIT, HybridHit, LexicalResults, MAX_QUERY_LIMIT,
    Observation, PaginatedResult, ProjectStats, SearchFilters, StorageStats, Timeline,
};
use agentmem_search::HybridSearch;
use agentmem_storage::StorageBackend;

use crate::ServiceError;

/// Read-side operations: lexical and hybrid search, context, lookups, stats.
pub struct SearchService {
    storage: Arc<dyn StorageBackend>,
    hybrid: HybridSearch,
}

impl SearchService {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, hybrid: HybridSearch) -> Self {
        Self { storage, hybrid }
    }

    // ── Search ─────────────────────────────────────────────────────────

    /// Full-text search over observations and summaries. An empty query
    /// matches nothing.
    pub async fn lexical_search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<LexicalResults, ServiceError> {
        validate_filters(filters)?;
        let filters =
            SearchFilters { limit: clamp_limit(Some(filters.limit)), ..filters.clone() };

        if query.trim().is_empty() {
            return Ok(LexicalResults::default());
        }

        let observations = self.storage.search_observations(query, &filters).await?;
        let summaries = self.storage.search_summaries(query, &filters).await?;
        Ok(LexicalResults { observations, summaries })
    }

    /// Observations matching type and creation window, newest first.
    pub async fn filter_observations(
        &self,
        filters: &SearchFilters,
    ) -> Result<Vec<Observation>, ServiceError> {
        validate_filters(filters)?;
        Ok(self
            .storage
            .list_filtered_observations(
                filters.project.as_deref(),
                filters.observation_type,
                filters.start_epoch,
                filters.end_epoch,
                clamp_limit(Some(filters.limit)),
            )
            .await?)
    }

    /// Vector-only search. Empty when no embedding provider is available.
    pub async fn semantic_search(
        &self,
        query: &str,
        project: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<HybridHit>, ServiceError> {
        if let Some(project) = project {
            validate_project(project)?;
        }
        self.hybrid
            .semantic(query, project, clamp_limit(limit))
            .await
            .map_err(ServiceError::Search)
    }

    /// Ranked hits with per-signal breakdown.
    pub async fn hybrid_search(
        &self,
        query: &str,
        project: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<HybridHit>, ServiceError> {
        if let Some(project) = project {
            validate_project(project)?;
        }
        self.hybrid.search(query, project, clamp_limit(limit)).await.map_err(ServiceError::Search)
    }

    /// What a new session in `project` should be reminded of.
    pub async fn get_context(
        &self,
        project: &str,
        limit: Option<usize>,
    ) -> Result<ContextBundle, ServiceError> {
        validate_project(project)?;
        let limit = clamp_limit(Some(limit.unwrap_or(DEFAULT_CONTEXT_LIMIT)));
        let observations = self
            .hybrid
            .search("", Some(project), limit)
            .await
            .map_err(ServiceError::Search)?
            .into_iter()
            .map(|hit| hit.observation)
            .collect();
        let summaries = self.storage.list_project_summaries(project, limit).await?;
        let display_name = self
            .storage
            .get_project_alias(project)
            .await?
            .map_or_else(|| project.to_owned(), |alias| alias.display_name);
        Ok(ContextBundle { project: project.to_owned(), display_name, observations, summaries })
    }

    pub async fn search_by_file(
        &self,
        file_path: &str,
        project: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Observation>, ServiceError> {
        if file_path.trim().is_empty() {
            return Err(ServiceError::InvalidInput("file path must not be empty".to_owned()));
        }
        Ok(self.storage.search_by_file(file_path, project, clamp_limit(limit)).await?)
    }

    // ── Lookups ────────────────────────────────────────────────────────

    /// Fetch up to 500 observations; unknown ids are skipped.
    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Observation>, ServiceError> {
        validate_ids(ids)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.storage.get_observations_by_ids(ids).await?)
    }

    pub async fn get_observation(&self, id: i64) -> Result<Option<Observation>, ServiceError> {
        Ok(self.storage.get_observation(id).await?)
    }

    pub async fn timeline(
        &self,
        anchor_id: i64,
        before: usize,
        after: usize,
    ) -> Result<Option<Timeline>, ServiceError> {
        let before = before.min(MAX_QUERY_LIMIT);
        let after = after.min(MAX_QUERY_LIMIT);
        Ok(self.storage.get_timeline(anchor_id, before, after).await?)
    }

    pub async fn list_observations(
        &self,
        project: Option<&str>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<PaginatedResult<Observation>, ServiceError> {
        Ok(self.storage.list_observations(project, offset, clamp_limit(limit)).await?)
    }

    pub async fn list_projects(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.storage.list_projects().await?)
    }

    /// Wait for the access-time updates searches schedule in the background.
    pub async fn flush_access_updates(&self) {
        self.hybrid.flush_access_updates().await;
    }

    // ── Stats ──────────────────────────────────────────────────────────

    pub async fn project_stats(&self, project: &str) -> Result<ProjectStats, ServiceError> {
        validate_project(project)?;
        Ok(self.storage.get_project_stats(project).await?)
    }

    pub async fn stats(&self) -> Result<StorageStats, ServiceError> {
        Ok(self.storage.get_stats().await?)
    }
}

fn validate_filters(filters: &SearchFilters) -> Result<(), ServiceError> {
    if let Some(project) = filters.project.as_deref() {
        validate_project(project)?;
    }
    if let (Some(start), Some(end)) = (filters.start_epoch, filters.end_epoch)
        && start > end
    {
        return Err(ServiceError::InvalidInput(format!(
            "start_epoch {start} is after end_epoch {end}"
        )));
    }
    Ok(())
}
