pub mod auth;
pub mod bot;
pub mod error;
pub mod middleware;
pub mod sessions;
pub mod upstream;
pub mod users;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{delete, get, post},
};

use moddeck_store::AccountStore;

use crate::sessions::SessionStore;
use crate::upstream::BotApi;

pub type AppState = Arc<AppStateInner>;

/// Shared state for all route handlers. Built once at startup and injected;
/// the session store lives and dies with the process.
pub struct AppStateInner {
    pub store: AccountStore,
    pub sessions: SessionStore,
    pub bot: BotApi,
    /// Controls the Secure flag on the session cookie.
    pub production: bool,
    pub started_at: Instant,
}

/// Assemble the API router: public routes, session-gated routes, and
/// admin-gated routes. Layer order matters on the admin group — the auth
/// layer is added last so it runs first and the admin check always sees an
/// authenticated session.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(bot::health))
        .route("/api/auth/login", post(auth::login));

    let session = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/bot/status", get(bot::status))
        .route("/api/bot/commands", get(bot::commands))
        .route("/api/bot/broadcast", post(bot::broadcast))
        .route("/api/bot/roblox/{discord_id}", get(bot::roblox_profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let admin = Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/{id}", delete(users::remove))
        .route("/api/bot/moderation", post(bot::moderation))
        .route("/api/bot/qotd", post(bot::qotd))
        .route("/api/bot/announcement", post(bot::announcement))
        .route("/api/bot/config", get(bot::get_config).post(bot::set_config))
        .route("/api/bot/applications", get(bot::applications))
        .layer(axum::middleware::from_fn(middleware::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(session)
        .merge(admin)
        .with_state(state)
}
