//! Storage backend trait abstraction
//!
//! Async domain traits over the synchronous `Storage`. Services depend on
//! [`StorageBackend`] so they can be handed any implementation.

pub mod embedding;
pub mod maintenance;
pub mod observation;
pub mod search;
pub mod session;

pub use embedding::EmbeddingStore;
pub use maintenance::MaintenanceStore;
pub use observation::ObservationStore;
pub use search::{SearchStore, StatsStore};
pub use session::{AliasStore, PromptStore, SessionStore, SummaryStore};

/// Every store the service layer needs, as one object-safe bound.
pub trait StorageBackend:
    ObservationStore
    + SummaryStore
    + SessionStore
    + PromptStore
    + AliasStore
    + SearchStore
    + StatsStore
    + EmbeddingStore
    + MaintenanceStore
{
}

impl<T> StorageBackend for T where
    T: ObservationStore
        + SummaryStore
        + SessionStore
        + PromptStore
        + AliasStore
        + SearchStore
        + StatsStore
        + EmbeddingStore
        + MaintenanceStore
{
}
