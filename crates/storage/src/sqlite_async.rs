//! Async trait implementations for `SQLite` `Storage` via `spawn_blocking`.

use agentmem_core::{
    ConsolidationReport, LexicalHit, NewObservation, NewSummary, NewUserPrompt, Observation,
    ObservationType, PaginatedResult, ProjectAlias, ProjectStats, SearchFilters, Session,
    StorageStats, Summary, SummaryHit, Timeline, UserPrompt, VectorMatch,
};
use async_trait::async_trait;

use crate::Storage;
use crate::error::{Result, StorageError};
use crate::storage::ConsolidationOptions;
use crate::traits::{
    AliasStore, EmbeddingStore, MaintenanceStore, ObservationStore, PromptStore, SearchStore,
    SessionStore, StatsStore, SummaryStore,
};

/// Helper: run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Blocking(format!("spawn_blocking join error: {e}")))?
}

/// Body-generating macro for async-to-blocking delegation.
///
/// Each argument is annotated with a capture kind:
/// - `@ref arg`      : `.clone()` a `&T`, pass as `&arg`
/// - `@str arg`      : `.to_owned()` a `&str`, pass as `&arg`
/// - `@opt_str arg`  : `.map(ToOwned::to_owned)` an `Option<&str>`, pass as `arg.as_deref()`
/// - `@slice arg`    : `.to_vec()` a `&[T]`, pass as `&arg`
/// - `@val arg`      : move directly (Copy/owned types)
macro_rules! delegate {
    ($self:ident, $method:ident $(, @$kind:ident $arg:ident)*) => {{
        let s = $self.clone();
        $(delegate!(@capture $kind $arg);)*
        blocking(move || s.$method($(delegate!(@pass $kind $arg)),*)).await
    }};
    (@capture ref $arg:ident) => { let $arg = $arg.clone(); };
    (@capture str $arg:ident) => { let $arg = $arg.to_owned(); };
    (@capture opt_str $arg:ident) => { let $arg = $arg.map(ToOwned::to_owned); };
    (@capture slice $arg:ident) => { let $arg = $arg.to_vec(); };
    (@capture val $arg:ident) => { };
    (@pass ref $arg:ident) => { &$arg };
    (@pass str $arg:ident) => { &$arg };
    (@pass opt_str $arg:ident) => { $arg.as_deref() };
    (@pass slice $arg:ident) => { &$arg };
    (@pass val $arg:ident) => { $arg };
}

// ── ObservationStore ─────────────────────────────────────────────

#[async_trait]
impl ObservationStore for Storage {
    async fn create_observation(&self, obs: &NewObservation) -> Result<i64> {
        delegate!(self, create_observation, @ref obs)
    }
    async fn get_observation(&self, id: i64) -> Result<Option<Observation>> {
        delegate!(self, get_observation, @val id)
    }
    async fn get_observations_by_ids(&self, ids: &[i64]) -> Result<Vec<Observation>> {
        delegate!(self, get_observations_by_ids, @slice ids)
    }
    async fn get_session_observations(&self, session_id: &str) -> Result<Vec<Observation>> {
        delegate!(self, get_session_observations, @str session_id)
    }
    async fn get_recent_observations(
        &self,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Observation>> {
        delegate!(self, get_recent_observations, @opt_str project, @val limit)
    }
    async fn list_observations(
        &self,
        project: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Observation>> {
        delegate!(self, list_observations, @opt_str project, @val offset, @val limit)
    }
    async fn search_by_file(
        &self,
        file_path: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Observation>> {
        delegate!(self, search_by_file, @str file_path, @opt_str project, @val limit)
    }
    async fn list_projects(&self) -> Result<Vec<String>> {
        delegate!(self, list_projects)
    }
}

// ── SessionStore ─────────────────────────────────────────────────

#[async_trait]
impl SessionStore for Storage {
    async fn create_or_get_session(
        &self,
        content_session_id: &str,
        project: &str,
        user_prompt: Option<&str>,
    ) -> Result<Session> {
        delegate!(self, create_or_get_session, @str content_session_id, @str project, @opt_str user_prompt)
    }
    async fn get_session_by_content_id(&self, content_session_id: &str) -> Result<Option<Session>> {
        delegate!(self, get_session_by_content_id, @str content_session_id)
    }
    async fn set_memory_session_id(
        &self,
        content_session_id: &str,
        memory_session_id: &str,
    ) -> Result<bool> {
        delegate!(self, set_memory_session_id, @str content_session_id, @str memory_session_id)
    }
    async fn complete_session(&self, content_session_id: &str) -> Result<bool> {
        delegate!(self, complete_session, @str content_session_id)
    }
    async fn fail_session(&self, content_session_id: &str) -> Result<bool> {
        delegate!(self, fail_session, @str content_session_id)
    }
}

// ── SummaryStore ─────────────────────────────────────────────────

#[async_trait]
impl SummaryStore for Storage {
    async fn create_summary(&self, summary: &NewSummary) -> Result<i64> {
        delegate!(self, create_summary, @ref summary)
    }
    async fn get_summary(&self, id: i64) -> Result<Option<Summary>> {
        delegate!(self, get_summary, @val id)
    }
    async fn get_session_summary(&self, session_id: &str) -> Result<Option<Summary>> {
        delegate!(self, get_session_summary, @str session_id)
    }
    async fn list_project_summaries(&self, project: &str, limit: usize) -> Result<Vec<Summary>> {
        delegate!(self, list_project_summaries, @str project, @val limit)
    }
}

// ── PromptStore ──────────────────────────────────────────────────

#[async_trait]
impl PromptStore for Storage {
    async fn save_user_prompt(&self, prompt: &NewUserPrompt) -> Result<i64> {
        delegate!(self, save_user_prompt, @ref prompt)
    }
    async fn get_session_prompts(&self, session_id: &str) -> Result<Vec<UserPrompt>> {
        delegate!(self, get_session_prompts, @str session_id)
    }
    async fn count_session_prompts(&self, session_id: &str) -> Result<usize> {
        delegate!(self, count_session_prompts, @str session_id)
    }
    async fn search_prompts(
        &self,
        query: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<UserPrompt>> {
        delegate!(self, search_prompts, @str query, @opt_str project, @val limit)
    }
}

// ── AliasStore ───────────────────────────────────────────────────

#[async_trait]
impl AliasStore for Storage {
    async fn upsert_project_alias(&self, project_name: &str, display_name: &str) -> Result<()> {
        delegate!(self, upsert_project_alias, @str project_name, @str display_name)
    }
    async fn get_project_alias(&self, project_name: &str) -> Result<Option<ProjectAlias>> {
        delegate!(self, get_project_alias, @str project_name)
    }
    async fn list_project_aliases(&self) -> Result<Vec<ProjectAlias>> {
        delegate!(self, list_project_aliases)
    }
}

// ── SearchStore ──────────────────────────────────────────────────

#[async_trait]
impl SearchStore for Storage {
    async fn search_observations(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<LexicalHit>> {
        delegate!(self, search_observations, @str query, @ref filters)
    }
    async fn search_summaries(&self, query: &str, filters: &SearchFilters) -> Result<Vec<SummaryHit>> {
        delegate!(self, search_summaries, @str query, @ref filters)
    }
    async fn list_filtered_observations(
        &self,
        project: Option<&str>,
        observation_type: Option<ObservationType>,
        start_epoch: Option<i64>,
        end_epoch: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Observation>> {
        delegate!(
            self,
            list_filtered_observations,
            @opt_str project,
            @val observation_type,
            @val start_epoch,
            @val end_epoch,
            @val limit
        )
    }
    async fn get_timeline(
        &self,
        anchor_id: i64,
        before: usize,
        after: usize,
    ) -> Result<Option<Timeline>> {
        delegate!(self, get_timeline, @val anchor_id, @val before, @val after)
    }
}

// ── StatsStore ───────────────────────────────────────────────────

#[async_trait]
impl StatsStore for Storage {
    async fn get_stats(&self) -> Result<StorageStats> {
        delegate!(self, get_stats)
    }
    async fn get_project_stats(&self, project: &str) -> Result<ProjectStats> {
        delegate!(self, get_project_stats, @str project)
    }
}

// ── EmbeddingStore ───────────────────────────────────────────────

#[async_trait]
impl EmbeddingStore for Storage {
    async fn store_embedding(&self, observation_id: i64, embedding: &[f32], model: &str) -> Result<()> {
        delegate!(self, store_embedding, @val observation_id, @slice embedding, @str model)
    }
    async fn get_embedding(&self, observation_id: i64) -> Result<Option<Vec<f32>>> {
        delegate!(self, get_embedding, @val observation_id)
    }
    async fn clear_embeddings(&self) -> Result<usize> {
        delegate!(self, clear_embeddings)
    }
    async fn get_observations_without_embeddings(
        &self,
        limit: usize,
        before_id: Option<i64>,
    ) -> Result<Vec<Observation>> {
        delegate!(self, get_observations_without_embeddings, @val limit, @val before_id)
    }
    async fn vector_search(
        &self,
        query: &[f32],
        project: Option<&str>,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<VectorMatch>> {
        delegate!(self, vector_search, @slice query, @opt_str project, @val limit, @val threshold)
    }
    async fn embedding_counts(&self) -> Result<(u64, u64)> {
        delegate!(self, embedding_counts)
    }
}

// ── MaintenanceStore ─────────────────────────────────────────────

#[async_trait]
impl MaintenanceStore for Storage {
    async fn touch_observations(&self, ids: &[i64], epoch_ms: i64) -> Result<usize> {
        delegate!(self, touch_observations, @slice ids, @val epoch_ms)
    }
    async fn mark_stale(&self, ids: &[i64]) -> Result<usize> {
        delegate!(self, mark_stale, @slice ids)
    }
    async fn get_fresh_observations_with_files(&self) -> Result<Vec<Observation>> {
        delegate!(self, get_fresh_observations_with_files)
    }
    async fn consolidate_observations(
        &self,
        options: ConsolidationOptions,
    ) -> Result<ConsolidationReport> {
        delegate!(self, consolidate_observations, @val options)
    }
}
