//! Text embeddings for agentmem semantic search.
//!
//! Providers sit behind [`EmbeddingProvider`]; [`EmbeddingService`] picks
//! the first one that loads from an ordered preference list and hides every
//! failure behind `Option`.

mod error;
mod hashing;
mod minilm;
mod provider;
mod service;

pub use error::EmbeddingError;
pub use hashing::HashingProvider;
pub use minilm::{FASTEMBED_MODEL_NAME, FastEmbedProvider};
pub use provider::{EmbeddingProvider, ProviderKind};
pub use service::EmbeddingService;
