use std::sync::Arc;

use agentmem_core::validation::validate_new_observation;
use agentmem_core::{NewObservation, Observation};
use agentmem_embeddings::EmbeddingService;
use agentmem_storage::StorageBackend;
use tokio::task::JoinHandle;

use crate::ServiceError;

/// Write path for observations: validate, insert, embed in the background.
pub struct ObservationService {
    storage: Arc<dyn StorageBackend>,
    embeddings: Arc<EmbeddingService>,
}

impl ObservationService {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, embeddings: Arc<EmbeddingService>) -> Self {
        Self { storage, embeddings }
    }

    /// Validate and insert an observation, then embed it on a detached task.
    ///
    /// The full-text index is updated by the insert itself. Embedding
    /// failures are logged and never reach the caller; the next backfill
    /// picks the row up.
    pub async fn create_observation(&self, obs: &NewObservation) -> Result<i64, ServiceError> {
        self.create_observation_tracked(obs).await.map(|(id, _)| id)
    }

    /// Like [`Self::create_observation`], also returning the embedding task
    /// so callers that need the vector (tests, batch importers) can await it.
    pub async fn create_observation_tracked(
        &self,
        obs: &NewObservation,
    ) -> Result<(i64, JoinHandle<bool>), ServiceError> {
        validate_new_observation(obs)?;
        let id = self.storage.create_observation(obs).await?;
        tracing::debug!(id, project = %obs.project, observation_type = %obs.observation_type, "observation saved");
        let handle = self.spawn_embedding(id, obs.embedding_text());
        Ok((id, handle))
    }

    pub async fn get_observation(&self, id: i64) -> Result<Option<Observation>, ServiceError> {
        Ok(self.storage.get_observation(id).await?)
    }

    pub async fn get_session_observations(
        &self,
        session_id: &str,
    ) -> Result<Vec<Observation>, ServiceError> {
        Ok(self.storage.get_session_observations(session_id).await?)
    }

    fn spawn_embedding(&self, id: i64, text: String) -> JoinHandle<bool> {
        let storage = Arc::clone(&self.storage);
        let embeddings = Arc::clone(&self.embeddings);
        tokio::spawn(async move {
            let Some(vector) = embeddings.embed_blocking(text).await else {
                return false;
            };
            let model = embeddings.provider_name().unwrap_or_default();
            match storage.store_embedding(id, &vector, &model).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(id, error = %e, "failed to store embedding, backfill will retry");
                    false
                },
            }
        })
    }
}
