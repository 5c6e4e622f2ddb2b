use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use repotrack_core::pipeline::{pipeline_error_to_status_code, PipelineError};
use repotrack_core::storage::{store_error_to_status_code, StoreError};

/// A request rejected by the HTTP layer before it reached a pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InvalidRequest(pub String);

/// Parses a path id. Ids are positive integers.
pub fn parse_id(raw: &str) -> Result<u64, InvalidRequest> {
    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(InvalidRequest(format!(
            "id must be a positive integer, got '{raw}'"
        ))),
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_and_field(&self) -> (StatusCode, Option<&'static str>) {
        let (code, field) = if let Some(err) = self.0.downcast_ref::<PipelineError>() {
            let field = match err {
                PipelineError::Validation(validation) => Some(validation.field),
                _ => None,
            };
            (pipeline_error_to_status_code(err), field)
        } else if let Some(err) = self.0.downcast_ref::<StoreError>() {
            (store_error_to_status_code(err), None)
        } else if self.0.is::<InvalidRequest>() || self.0.is::<JsonRejection>() {
            (400, None)
        } else {
            (500, None)
        };

        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, field)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, field) = self.status_and_field();
        if status.is_server_error() {
            tracing::error!(%status, error = %self.0, "Request failed");
        }

        let body = ErrorBody {
            error: self.0.to_string(),
            field,
        };
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    use repotrack_core::domain::{ValidationError, ValidationReason};

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Ok(42));
        assert!(parse_id("0").is_err());
        assert!(parse_id("-1").is_err());
        assert!(parse_id("abc").is_err());
    }

    #[tokio::test]
    async fn test_validation_error_names_field() {
        let error: AppError = PipelineError::from(ValidationError::new(
            "email",
            ValidationReason::InvalidEmail,
        ))
        .into();

        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "email must be a valid email address");
        assert_eq!(body["field"], "email");
    }

    #[tokio::test]
    async fn test_breaker_open_is_unavailable() {
        let error: AppError = PipelineError::BreakerOpen {
            name: "store".to_string(),
        }
        .into();

        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.get("field").is_none());
    }

    #[tokio::test]
    async fn test_store_errors_map_through_pipeline() {
        let (status, _) = render(PipelineError::Store(StoreError::not_found("User", 1)).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            render(PipelineError::Store(StoreError::already_exists("User", "a@b.co")).into())
                .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = render(StoreError::QueryFailed("boom".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_request_is_bad_request() {
        let (status, body) = render(InvalidRequest("bad id".to_string()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad id");
    }

    #[tokio::test]
    async fn test_unknown_error_is_internal() {
        let (status, _) = render(anyhow::anyhow!("unexpected").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
