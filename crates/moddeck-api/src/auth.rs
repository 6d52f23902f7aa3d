use axum::{Extension, Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{Value, json};
use tracing::info;

use moddeck_types::{LoginRequest, PublicUser, Validate};

use crate::AppState;
use crate::error::ApiError;
use crate::sessions::{SESSION_COOKIE, Session, session_cookie};

/// POST /api/auth/login — verify credentials, establish a session, set the
/// session cookie. The response never includes the password hash.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    let account = state
        .store
        .get_by_username(&req.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !state.store.verify_password(&req.password, &account.password) {
        return Err(ApiError::InvalidCredentials);
    }

    state.store.update_last_login(account.id).await?;

    let user = PublicUser::from(&account);
    let token = state.sessions.create(user.clone());
    let cookie = session_cookie(token, state.production);

    info!("Session established for {}", user.username);
    Ok((jar.add(cookie), Json(json!({ "user": user }))))
}

/// POST /api/auth/logout — destroy the session and expire the cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::Unauthenticated)?;

    if !state.sessions.remove(&token) {
        return Err(ApiError::Internal("Failed to logout".into()));
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(json!({ "message": "Logged out successfully" }))))
}

/// GET /api/auth/me — the current account, re-read from the store rather than
/// the session snapshot so deletions are noticed.
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, ApiError> {
    let account = state
        .store
        .get_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(json!({ "user": PublicUser::from(&account) })))
}
