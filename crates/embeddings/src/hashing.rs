//! Deterministic feature-hashing embeddings.
//!
//! Each lowercased word and each of its character trigrams is hashed with
//! FNV-1a into one of `dimensions` buckets with a hash-derived sign. Texts
//! sharing vocabulary land close together; nothing is downloaded.

use agentmem_core::{EMBEDDING_DIMENSION, l2_normalize};

use crate::error::EmbeddingError;
use crate::provider::EmbeddingProvider;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const TRIGRAM_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct HashingProvider {
    dimensions: usize,
}

impl HashingProvider {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self::new(EMBEDDING_DIMENSION)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl HashingProvider {
    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        if let Some(slot) = vector.get_mut(bucket) {
            *slot += sign * weight;
        }
    }
}

impl EmbeddingProvider for HashingProvider {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dimensions];
        let mut features = 0usize;
        let lowered = text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric() && c != '_') {
            if token.is_empty() {
                continue;
            }
            self.add_feature(&mut vector, token.as_bytes(), 1.0);
            features += 1;

            let chars: Vec<char> = token.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, trigram.as_bytes(), TRIGRAM_WEIGHT);
            }
        }
        if features == 0 {
            return Err(EmbeddingError::EmptyResult);
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}
