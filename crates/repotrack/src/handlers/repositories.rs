use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use repotrack_core::domain::{Repository, RepositoryDraft};
use repotrack_core::storage::StoreError;

use crate::handlers::error::{parse_id, AppError};
use crate::state::AppState;

/// List all repositories with their owners (GET /repositories).
pub async fn list_repositories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Repository>>, AppError> {
    Ok(Json(state.repositories.list_repositories().await?))
}

/// Create a repository (POST /repositories).
pub async fn create_repository(
    State(state): State<AppState>,
    payload: Result<Json<RepositoryDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Repository>), AppError> {
    let Json(draft) = payload?;
    let repository = state.repositories.create_repository(&draft).await?;
    Ok((StatusCode::CREATED, Json(repository)))
}

/// Get a single repository by ID (GET /repositories/{id}).
pub async fn get_repository(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Repository>, AppError> {
    let id = parse_id(&id)?;
    state
        .repositories
        .get_repository(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::from(StoreError::not_found("Repository", id)))
}

/// Replace a repository (PUT /repositories/{id}).
pub async fn update_repository(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RepositoryDraft>, JsonRejection>,
) -> Result<Json<Repository>, AppError> {
    let id = parse_id(&id)?;
    let Json(draft) = payload?;
    Ok(Json(
        state.repositories.update_repository(id, &draft).await?,
    ))
}

/// Delete a repository (DELETE /repositories/{id}).
pub async fn delete_repository(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.repositories.delete_repository(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
