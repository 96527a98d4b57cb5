use agentmem_core::{
    NewSummary, NewUserPrompt, ProjectAlias, Session, Summary, UserPrompt,
};
use async_trait::async_trait;

use crate::error::StorageError;

/// Session lifecycle operations.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the session for a content id, creating an active one if needed.
    async fn create_or_get_session(
        &self,
        content_session_id: &str,
        project: &str,
        user_prompt: Option<&str>,
    ) -> Result<Session, StorageError>;

    /// Get session by content session id.
    async fn get_session_by_content_id(
        &self,
        content_session_id: &str,
    ) -> Result<Option<Session>, StorageError>;

    /// Record the memory-side session id.
    async fn set_memory_session_id(
        &self,
        content_session_id: &str,
        memory_session_id: &str,
    ) -> Result<bool, StorageError>;

    /// `active` → `completed`. Returns whether a transition happened.
    async fn complete_session(&self, content_session_id: &str) -> Result<bool, StorageError>;

    /// `active` → `failed`. Returns whether a transition happened.
    async fn fail_session(&self, content_session_id: &str) -> Result<bool, StorageError>;
}

/// Session summary storage.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn create_summary(&self, summary: &NewSummary) -> Result<i64, StorageError>;

    async fn get_summary(&self, id: i64) -> Result<Option<Summary>, StorageError>;

    async fn get_session_summary(&self, session_id: &str) -> Result<Option<Summary>, StorageError>;

    async fn list_project_summaries(
        &self,
        project: &str,
        limit: usize,
    ) -> Result<Vec<Summary>, StorageError>;
}

/// User prompt storage.
#[async_trait]
pub trait PromptStore: Send + Sync {
    async fn save_user_prompt(&self, prompt: &NewUserPrompt) -> Result<i64, StorageError>;

    async fn get_session_prompts(&self, session_id: &str) -> Result<Vec<UserPrompt>, StorageError>;

    async fn count_session_prompts(&self, session_id: &str) -> Result<usize, StorageError>;

    async fn search_prompts(
        &self,
        query: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<UserPrompt>, StorageError>;
}

/// Project display-name aliases.
#[async_trait]
pub trait AliasStore: Send + Sync {
    async fn upsert_project_alias(
        &self,
        project_name: &str,
        display_name: &str,
    ) -> Result<(), StorageError>;

    async fn get_project_alias(
        &self,
        project_name: &str,
    ) -> Result<Option<ProjectAlias>, StorageError>;

    async fn list_project_aliases(&self) -> Result<Vec<ProjectAlias>, StorageError>;
}
