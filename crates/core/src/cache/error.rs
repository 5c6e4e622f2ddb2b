use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// None of these ever fail a request; callers log them and carry on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Cache operation timed out after {0}ms")]
    Timeout(u64),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
