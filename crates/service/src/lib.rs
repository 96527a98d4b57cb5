//! Service layer for agentmem
//!
//! Validates caller input at the boundary and composes storage, embeddings
//! and hybrid search into the operations the CLI exposes.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]

mod error;
mod maintenance_service;
mod observation_service;
mod search_service;
mod session_service;

use std::sync::Arc;

use agentmem_core::MemoryConfig;
use agentmem_embeddings::EmbeddingService;
use agentmem_search::HybridSearch;
use agentmem_storage::{Storage, StorageBackend};

pub use error::ServiceError;
pub use maintenance_service::MaintenanceService;
pub use observation_service::ObservationService;
pub use search_service::SearchService;
pub use session_service::SessionService;

/// Every service wired to one storage backend and one embedding service.
pub struct MemoryServices {
    pub observations: ObservationService,
    pub sessions: SessionService,
    pub search: SearchService,
    pub maintenance: MaintenanceService,
    pub embeddings: Arc<EmbeddingService>,
}

impl MemoryServices {
    /// Open (and migrate) the database named by `config` and build the services.
    pub fn open(config: &MemoryConfig) -> Result<Self, ServiceError> {
        let storage: Arc<dyn StorageBackend> = Arc::new(Storage::from_config(config)?);
        let embeddings = Arc::new(EmbeddingService::from_config(config));
        Ok(Self::from_parts(storage, embeddings, config))
    }

    #[must_use]
    pub fn from_parts(
        storage: Arc<dyn StorageBackend>,
        embeddings: Arc<EmbeddingService>,
        config: &MemoryConfig,
    ) -> Self {
        let hybrid =
            HybridSearch::new(Arc::clone(&storage), Arc::clone(&embeddings), config.search.clone());
        Self {
            observations: ObservationService::new(Arc::clone(&storage), Arc::clone(&embeddings)),
            sessions: SessionService::new(Arc::clone(&storage)),
            search: SearchService::new(Arc::clone(&storage), hybrid),
            maintenance: MaintenanceService::new(
                storage,
                Arc::clone(&embeddings),
                config.consolidation_min_group,
            ),
            embeddings,
        }
    }
}

#[cfg(test)]
mod tests;
