//! Provider abstraction and the tagged provider selection enum.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::EmbeddingError;
use crate::hashing::HashingProvider;
use crate::minilm::FastEmbedProvider;

/// A text-to-vector backend. Implementations are synchronous and may be
/// CPU-heavy; async callers move them onto a blocking thread.
pub trait EmbeddingProvider: Send + Sync {
    /// Short identifier recorded alongside stored vectors.
    fn name(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Providers that can be named in `AGENTMEM_EMBEDDING_PROVIDERS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// all-MiniLM-L6-v2 through fastembed (downloads the model on first use).
    FastEmbed,
    /// Deterministic feature hashing, no model download.
    Hashing,
}

impl ProviderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FastEmbed => "fastembed",
            Self::Hashing => "hash",
        }
    }

    /// Construct the provider. Failure means the next preference is tried.
    pub fn load(self) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
        match self {
            Self::FastEmbed => Ok(Arc::new(FastEmbedProvider::try_new()?)),
            Self::Hashing => Ok(Arc::new(HashingProvider::default())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = EmbeddingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fastembed" | "minilm" | "all-minilm-l6-v2" => Ok(Self::FastEmbed),
            "hash" | "hashing" => Ok(Self::Hashing),
            other => Err(EmbeddingError::UnknownProvider(other.to_owned())),
        }
    }
}
