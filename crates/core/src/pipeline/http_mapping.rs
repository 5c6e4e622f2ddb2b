use crate::storage::store_error_to_status_code;

use super::PipelineError;

/// Maps a [`PipelineError`] to an HTTP status code.
///
/// Validation failures are the client's fault (400), an open breaker means the
/// store is unavailable (503), store errors use [`store_error_to_status_code`].
pub fn pipeline_error_to_status_code(error: &PipelineError) -> u16 {
    match error {
        PipelineError::Validation(_) => 400,
        PipelineError::BreakerOpen { .. } => 503,
        PipelineError::Store(err) => store_error_to_status_code(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ValidationError, ValidationReason};
    use crate::storage::StoreError;

    #[test]
    fn test_validation_maps_to_400() {
        let error = PipelineError::Validation(ValidationError::new(
            "user_id",
            ValidationReason::MissingReference,
        ));
        assert_eq!(pipeline_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_breaker_open_maps_to_503() {
        let error = PipelineError::BreakerOpen {
            name: "store".to_string(),
        };
        assert_eq!(pipeline_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_store_errors_delegate() {
        let error = PipelineError::Store(StoreError::already_exists("User", "a@b.co"));
        assert_eq!(pipeline_error_to_status_code(&error), 409);
        let error = PipelineError::Store(StoreError::QueryFailed("boom".to_string()));
        assert_eq!(pipeline_error_to_status_code(&error), 500);
    }
}
