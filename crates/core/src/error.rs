use std::io;
use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised by the core crate (parsing and boundary validation).
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown observation type: {0}")]
    UnknownObservationType(String),

    #[error("Invalid session status: {0}")]
    InvalidSessionStatus(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Whether this error came from boundary validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::UnknownObservationType(_) | Self::InvalidSessionStatus(_)
        )
    }
}

pub type Result<T> = StdResult<T, CoreError>;
