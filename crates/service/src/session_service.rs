use std::sync::Arc;

use agentmem_core::validation::{
    clamp_limit, validate_new_prompt, validate_new_summary, validate_project, validate_session_id,
};
use agentmem_core::{
    MAX_PROJECT_NAME_CHARS, NewSummary, NewUserPrompt, ProjectAlias, Session, Summary, UserPrompt,
};
use agentmem_storage::StorageBackend;

use crate::ServiceError;

/// Session lifecycle, summaries, prompts and project aliases.
pub struct SessionService {
    storage: Arc<dyn StorageBackend>,
}

impl SessionService {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    // ── Sessions ───────────────────────────────────────────────────────

    /// Returns the existing session for `content_session_id`, or starts one.
    pub async fn start_session(
        &self,
        content_session_id: &str,
        project: &str,
        user_prompt: Option<&str>,
    ) -> Result<Session, ServiceError> {
        validate_session_id(content_session_id)?;
        validate_project(project)?;
        let session =
            self.storage.create_or_get_session(content_session_id, project, user_prompt).await?;
        tracing::info!(session = content_session_id, project, status = %session.status, "session started");
        Ok(session)
    }

    pub async fn get_session(
        &self,
        content_session_id: &str,
    ) -> Result<Option<Session>, ServiceError> {
        Ok(self.storage.get_session_by_content_id(content_session_id).await?)
    }

    pub async fn set_memory_session_id(
        &self,
        content_session_id: &str,
        memory_session_id: &str,
    ) -> Result<bool, ServiceError> {
        validate_session_id(memory_session_id)?;
        Ok(self.storage.set_memory_session_id(content_session_id, memory_session_id).await?)
    }

    /// Returns `false` when the session is unknown or already finished.
    pub async fn complete_session(&self, content_session_id: &str) -> Result<bool, ServiceError> {
        let changed = self.storage.complete_session(content_session_id).await?;
        if !changed {
            tracing::debug!(session = content_session_id, "complete ignored, session not active");
        }
        Ok(changed)
    }

    pub async fn fail_session(&self, content_session_id: &str) -> Result<bool, ServiceError> {
        let changed = self.storage.fail_session(content_session_id).await?;
        if !changed {
            tracing::debug!(session = content_session_id, "fail ignored, session not active");
        }
        Ok(changed)
    }

    // ── Summaries ──────────────────────────────────────────────────────

    pub async fn create_summary(&self, summary: &NewSummary) -> Result<i64, ServiceError> {
        validate_new_summary(summary)?;
        let id = self.storage.create_summary(summary).await?;
        tracing::debug!(id, session = %summary.session_id, "summary saved");
        Ok(id)
    }

    pub async fn get_summary(&self, id: i64) -> Result<Option<Summary>, ServiceError> {
        Ok(self.storage.get_summary(id).await?)
    }

    pub async fn get_session_summary(
        &self,
        session_id: &str,
    ) -> Result<Option<Summary>, ServiceError> {
        Ok(self.storage.get_session_summary(session_id).await?)
    }

    pub async fn list_project_summaries(
        &self,
        project: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Summary>, ServiceError> {
        Ok(self.storage.list_project_summaries(project, clamp_limit(limit)).await?)
    }

    // ── Prompts ────────────────────────────────────────────────────────

    pub async fn record_prompt(&self, prompt: &NewUserPrompt) -> Result<i64, ServiceError> {
        validate_new_prompt(prompt)?;
        Ok(self.storage.save_user_prompt(prompt).await?)
    }

    pub async fn list_prompts(&self, session_id: &str) -> Result<Vec<UserPrompt>, ServiceError> {
        Ok(self.storage.get_session_prompts(session_id).await?)
    }

    pub async fn count_prompts(&self, session_id: &str) -> Result<usize, ServiceError> {
        Ok(self.storage.count_session_prompts(session_id).await?)
    }

    pub async fn search_prompts(
        &self,
        query: &str,
        project: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<UserPrompt>, ServiceError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.storage.search_prompts(query, project, clamp_limit(limit)).await?)
    }

    // ── Project aliases ────────────────────────────────────────────────

    /// Give `project_name` a display name; repeated renames overwrite it.
    pub async fn rename_project(
        &self,
        project_name: &str,
        display_name: &str,
    ) -> Result<(), ServiceError> {
        validate_project(project_name)?;
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ServiceError::InvalidInput("display name must not be empty".to_owned()));
        }
        if display_name.chars().count() > MAX_PROJECT_NAME_CHARS {
            return Err(ServiceError::InvalidInput(format!(
                "display name exceeds {MAX_PROJECT_NAME_CHARS} characters"
            )));
        }
        self.storage.upsert_project_alias(project_name, display_name).await?;
        tracing::info!(project = project_name, display_name, "project renamed");
        Ok(())
    }

    pub async fn get_project_alias(
        &self,
        project_name: &str,
    ) -> Result<Option<ProjectAlias>, ServiceError> {
        Ok(self.storage.get_project_alias(project_name).await?)
    }

    pub async fn list_project_aliases(&self) -> Result<Vec<ProjectAlias>, ServiceError> {
        Ok(self.storage.list_project_aliases().await?)
    }
}
