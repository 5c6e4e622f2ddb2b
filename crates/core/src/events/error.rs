use thiserror::Error;

/// Errors that can occur while handing an event to the publisher.
///
/// Mutations never fail because of these; the pipeline logs them and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Publisher connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Publish failed: {0}")]
    PublishFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Publish timed out after {0}ms")]
    Timeout(u64),
}

/// Result type for publisher operations.
pub type Result<T> = std::result::Result<T, PublishError>;
