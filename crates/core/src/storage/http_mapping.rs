//! Pure functions for mapping store errors to HTTP status codes.

use super::StoreError;

/// Maps a [`StoreError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `AlreadyExists` -> 409 (Conflict)
/// - `InvalidData` -> 400 (Bad Request)
/// - `ConnectionFailed` -> 503 (Service Unavailable)
/// - `Timeout` -> 503 (Service Unavailable)
/// - `QueryFailed` -> 500 (Internal Server Error)
/// - `Serialization` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use repotrack_core::storage::{store_error_to_status_code, StoreError};
///
/// let error = StoreError::not_found("User", 7);
/// assert_eq!(store_error_to_status_code(&error), 404);
/// ```
pub fn store_error_to_status_code(error: &StoreError) -> u16 {
    match error {
        StoreError::NotFound { .. } => 404,
        StoreError::AlreadyExists { .. } => 409,
        StoreError::InvalidData(_) => 400,
        StoreError::ConnectionFailed(_) => 503,
        StoreError::Timeout(_) => 503,
        StoreError::QueryFailed(_) => 500,
        StoreError::Serialization(_) => 500,
    }
}
