//! all-MiniLM-L6-v2 via the `fastembed` crate.

use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use agentmem_core::EMBEDDING_DIMENSION;

use crate::error::EmbeddingError;
use crate::provider::EmbeddingProvider;

pub const FASTEMBED_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// `TextEmbedding::embed` takes `&mut self`, so the model sits behind a mutex.
pub struct FastEmbedProvider {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedProvider {
    /// Load the ONNX model, downloading it into the fastembed cache if needed.
    pub fn try_new() -> Result<Self, EmbeddingError> {
        tracing::info!(model = FASTEMBED_MODEL_NAME, "initializing fastembed model");
        let options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        let model =
            TextEmbedding::try_new(options).map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;
        Ok(Self { model: Mutex::new(model) })
    }
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider").field("model", &FASTEMBED_MODEL_NAME).finish()
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn name(&self) -> &str {
        FASTEMBED_MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut model = self.model.lock().map_err(|_| EmbeddingError::LockPoisoned)?;
        let vectors =
            model.embed(vec![text], None).map_err(|e| EmbeddingError::Generation(e.to_string()))?;
        let vector = vectors.into_iter().next().ok_or(EmbeddingError::EmptyResult)?;
        if vector.len() != EMBEDDING_DIMENSION {
            return Err(EmbeddingError::DimensionMismatch {
                expected: EMBEDDING_DIMENSION,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "Downloads model from network, slow"]
    fn embeds_to_expected_dimension() {
        let provider = FastEmbedProvider::try_new().unwrap();
        let vector = provider.embed("fixed the login redirect bug").unwrap();
        assert_eq!(vector.len(), EMBEDDING_DIMENSION);
    }

    #[test]
    #[ignore = "Downloads model from network, slow"]
    fn related_texts_are_closer_than_unrelated() {
        let provider = FastEmbedProvider::try_new().unwrap();
        let a = provider.embed("database connection pool exhausted").unwrap();
        let b = provider.embed("sqlite pool ran out of connections").unwrap();
        let c = provider.embed("the cat sat on a warm windowsill").unwrap();
        let ab = agentmem_core::cosine_similarity(&a, &b).unwrap();
        let ac = agentmem_core::cosine_similarity(&a, &c).unwrap();
        assert!(ab > ac);
    }
}
