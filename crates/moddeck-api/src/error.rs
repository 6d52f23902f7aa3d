use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use moddeck_store::StoreError;
use moddeck_types::FieldError;

/// Error taxonomy for every route handler. Each variant maps to one HTTP
/// status and a JSON `{message}` body; validation failures additionally carry
/// the field-level violations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Admin access required")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ApiError::Validation(errors) => json!({
                "message": "Invalid input",
                "errors": errors,
            }),
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => ApiError::Conflict("Username already exists".into()),
            StoreError::SelfDeletion => ApiError::Conflict("Cannot delete your own account".into()),
            StoreError::NotFound => ApiError::NotFound("User not found".into()),
            other => {
                warn!("Account store error: {}", other);
                ApiError::Internal("Internal server error".into())
            }
        }
    }
}
