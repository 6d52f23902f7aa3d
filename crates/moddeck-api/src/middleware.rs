use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;

use moddeck_types::Role;

use crate::AppState;
use crate::error::ApiError;
use crate::sessions::SESSION_COOKIE;

/// Resolve the session cookie and attach the session to the request.
/// Rejects with 401 when the cookie is missing, unknown, or expired.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::Unauthenticated)?;

    let session = state.sessions.get(&token).ok_or(ApiError::Unauthenticated)?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Rejects with 403 unless the authenticated session's role is admin.
/// Must be layered inside [`require_auth`], which provides the session.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let session = req
        .extensions()
        .get::<crate::sessions::Session>()
        .ok_or(ApiError::Unauthenticated)?;

    if session.user.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}
