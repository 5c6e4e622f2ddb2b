use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use repotrack_core::domain::{User, UserDraft};
use repotrack_core::storage::StoreError;

use crate::handlers::error::{parse_id, AppError};
use crate::state::AppState;

/// List all users (GET /users).
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list_users().await?))
}

/// Create a user (POST /users).
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(draft) = payload?;
    let user = state.users.create_user(&draft).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a single user by ID (GET /users/{id}).
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&id)?;
    state
        .users
        .get_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::from(StoreError::not_found("User", id)))
}

/// Replace a user's name and email (PUT /users/{id}).
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserDraft>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&id)?;
    let Json(draft) = payload?;
    Ok(Json(state.users.update_user(id, &draft).await?))
}

/// Delete a user (DELETE /users/{id}). Their repositories are kept without an owner.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
