//! In-memory session store keyed by a random cookie token.
//!
//! Sessions hold a snapshot of the account taken at login time; role changes
//! are only picked up on re-login. State is process-local, so a restart logs
//! everyone out.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use tracing::info;

use moddeck_types::PublicUser;

use crate::AppState;

pub const SESSION_COOKIE: &str = "moddeck_session";

/// Absolute session lifetime; matches the cookie max-age.
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub user: PublicUser,
    pub expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish a session for a logged-in user and return its cookie token.
    pub fn create(&self, user: PublicUser) -> String {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        let session = Session {
            user_id: user.id,
            user,
            expires_at: Utc::now() + chrono::Duration::hours(SESSION_TTL_HOURS),
        };
        self.lock().insert(token.clone(), session);
        token
    }

    /// Resolve a token to its session. Expired entries are removed on sight.
    pub fn get(&self, token: &str) -> Option<Session> {
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Some(session.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Destroy a session (logout). Returns whether the token was present.
    pub fn remove(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    pub fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        // A poisoned lock only means another request panicked mid-access;
        // the map itself is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Build the session cookie. HttpOnly always; Secure only in production so
/// local development over plain HTTP still works.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::hours(SESSION_TTL_HOURS));
    cookie
}

/// Background task that prunes expired sessions on an interval.
pub async fn run_prune_loop(state: AppState, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;
        let pruned = state.sessions.prune_expired();
        if pruned > 0 {
            info!("Pruned {} expired sessions", pruned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moddeck_types::Role;

    fn snapshot(id: i64, role: Role) -> PublicUser {
        PublicUser {
            id,
            username: format!("user{id}"),
            role,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    fn insert_expired(store: &SessionStore, token: &str, user: PublicUser) {
        store.lock().insert(
            token.to_string(),
            Session {
                user_id: user.id,
                user,
                expires_at: Utc::now() - chrono::Duration::minutes(1),
            },
        );
    }

    #[test]
    fn create_then_get_roundtrip() {
        let store = SessionStore::new();
        let token = store.create(snapshot(7, Role::Admin));
        let session = store.get(&token).unwrap();
        assert_eq!(session.user_id, 7);
        assert_eq!(session.user.role, Role::Admin);
    }

    #[test]
    fn tokens_are_unique_and_opaque() {
        let store = SessionStore::new();
        let a = store.create(snapshot(1, Role::User));
        let b = store.create(snapshot(1, Role::User));
        assert_ne!(a, b);
        assert!(a.len() >= 40); // 32 bytes base64
    }

    #[test]
    fn expired_sessions_are_dropped_on_lookup() {
        let store = SessionStore::new();
        insert_expired(&store, "stale", snapshot(1, Role::User));
        assert!(store.get("stale").is_none());
        // removed, not just hidden
        assert!(store.lock().get("stale").is_none());
    }

    #[test]
    fn remove_destroys_exactly_once() {
        let store = SessionStore::new();
        let token = store.create(snapshot(1, Role::User));
        assert!(store.remove(&token));
        assert!(!store.remove(&token));
        assert!(store.get(&token).is_none());
    }

    #[test]
    fn prune_counts_only_expired() {
        let store = SessionStore::new();
        let live = store.create(snapshot(1, Role::User));
        insert_expired(&store, "old1", snapshot(2, Role::User));
        insert_expired(&store, "old2", snapshot(3, Role::User));
        assert_eq!(store.prune_expired(), 2);
        assert!(store.get(&live).is_some());
    }
}
