//! Typed error enum for the service layer.
//!
//! Unifies validation, storage and search failures so callers can match on
//! the failure mode instead of downcasting an opaque `anyhow::Error`.

use agentmem_core::CoreError;
use agentmem_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (database, pool, corrupt row).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Caller provided invalid input; nothing was written.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Hybrid search failed (wraps anyhow from the search crate).
    #[error("search: {0}")]
    Search(#[source] anyhow::Error),

    /// A blocking or detached task panicked or was cancelled.
    #[error("task: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// Non-validation failure from the core crate.
    #[error("core: {0}")]
    Core(#[source] CoreError),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_not_found())
    }

    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        if err.is_validation() {
            match err {
                CoreError::InvalidInput(msg) => Self::InvalidInput(msg),
                other => Self::InvalidInput(other.to_string()),
            }
        } else {
            Self::Core(err)
        }
    }
}
