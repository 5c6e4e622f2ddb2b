use thiserror::Error;

use crate::breaker::BreakerError;
use crate::domain::ValidationError;
use crate::storage::StoreError;

/// Errors a pipeline surfaces to its caller.
///
/// Cache and publish failures never show up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Store unavailable: circuit breaker '{name}' is open")]
    BreakerOpen { name: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BreakerError<StoreError>> for PipelineError {
    fn from(err: BreakerError<StoreError>) -> Self {
        match err {
            BreakerError::Open { name } => Self::BreakerOpen { name },
            BreakerError::Operation(err) => Self::Store(err),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
