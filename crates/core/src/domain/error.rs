use thiserror::Error;

/// Why a field was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    #[error("must not be empty")]
    Empty,
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
    #[error("must be a valid email address")]
    InvalidEmail,
    #[error("must be an absolute URL")]
    InvalidUrl,
    #[error("is required")]
    MissingReference,
}

/// A field-level invariant violated by client input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: ValidationReason) -> Self {
        Self { field, reason }
    }
}
