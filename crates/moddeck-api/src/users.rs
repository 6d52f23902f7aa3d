use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use moddeck_types::{CreateUserRequest, PublicUser, Validate};

use crate::AppState;
use crate::error::ApiError;
use crate::sessions::Session;

/// GET /api/users — all accounts, hashes stripped.
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users: Vec<PublicUser> = state
        .store
        .list_all()
        .await?
        .iter()
        .map(PublicUser::from)
        .collect();

    Ok(Json(json!({ "users": users })))
}

/// POST /api/users — create a dashboard account.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    let account = state.store.create(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": PublicUser::from(&account) })),
    ))
}

/// DELETE /api/users/{id} — remove an account. Deleting yourself is refused.
/// The id is parsed by hand so a garbage path segment gets the JSON error
/// body rather than a bare extractor rejection.
pub async fn remove(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid user ID".into()))?;

    state.store.delete(id, session.user_id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
