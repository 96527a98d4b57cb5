use agentmem_core::{Observation, VectorMatch};
use async_trait::async_trait;

use crate::error::StorageError;

/// Embedding storage operations.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Store (or replace) an embedding vector for an observation.
    async fn store_embedding(
        &self,
        observation_id: i64,
        embedding: &[f32],
        model: &str,
    ) -> Result<(), StorageError>;

    /// Stored vector of an observation.
    async fn get_embedding(&self, observation_id: i64) -> Result<Option<Vec<f32>>, StorageError>;

    /// Drop every embedding, forcing re-embedding of all observations.
    async fn clear_embeddings(&self) -> Result<usize, StorageError>;

    /// Observations that don't have embeddings yet, highest id first,
    /// starting below `before_id` when given.
    async fn get_observations_without_embeddings(
        &self,
        limit: usize,
        before_id: Option<i64>,
    ) -> Result<Vec<Observation>, StorageError>;

    /// Cosine-similarity matches above `threshold`, best first.
    async fn vector_search(
        &self,
        query: &[f32],
        project: Option<&str>,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<VectorMatch>, StorageError>;

    /// `(total observations, embedded observations)`.
    async fn embedding_counts(&self) -> Result<(u64, u64), StorageError>;
}
