use thiserror::Error;

use crate::storage::StoreError;

/// Outcome of a call made through a circuit breaker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BreakerError<E> {
    /// The breaker rejected the call without running it.
    #[error("Circuit breaker '{name}' is open")]
    Open { name: String },
    /// The call ran and failed.
    #[error("{0}")]
    Operation(E),
}

impl<E> BreakerError<E> {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// Decides whether an operation error counts against the breaker.
///
/// Errors showing that the dependency answered (a missing row, a duplicate key)
/// must not open the breaker.
pub trait BreakerOutcome {
    fn is_breaker_failure(&self) -> bool;
}

impl BreakerOutcome for StoreError {
    fn is_breaker_failure(&self) -> bool {
        !self.is_client_error()
    }
}
