//! HTTP client for the externally-hosted bot process's control API.
//!
//! Two failure policies exist, chosen per endpoint:
//! - [`BotApi::fetch_or`] degrades to a caller-supplied fallback so passive
//!   reads never block dashboard rendering;
//! - [`BotApi::submit`] surfaces every failure so the operator learns that a
//!   command did not execute.
//!
//! Calls are one-shot: no retries, no backoff, no explicit timeout beyond
//! client defaults.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use moddeck_types::BotStatus;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Bot API responded with status {0}")]
    Status(u16),
    #[error("Bot API unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

pub struct BotApi {
    client: reqwest::Client,
    base_url: String,
    secret: String,
}

impl BotApi {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        BotApi {
            client: reqwest::Client::new(),
            base_url,
            secret: secret.into(),
        }
    }

    /// Surface-on-failure: POST an action payload, error on any non-2xx or
    /// transport failure.
    pub async fn submit(&self, path: &str, payload: &Value) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.secret)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Degrade-on-failure: GET a resource, fall back to the supplied value on
    /// any failure.
    pub async fn fetch_or(&self, path: &str, fallback: Value) -> Value {
        match self.fetch(path).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Bot API read {} failed, serving fallback: {}", path, e);
                fallback
            }
        }
    }

    pub async fn fetch(&self, path: &str) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.secret)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Bot status with a two-step fallback chain, never an error:
    /// full `/api/status`, then the lighter `/health` probe (its body text is
    /// the only signal, so the result is a minimal "limited" shape), then a
    /// fully offline record.
    pub async fn status(&self) -> Value {
        match self.fetch("/api/status").await {
            Ok(body) => body,
            Err(e) => {
                warn!("Bot status probe failed ({}), trying health endpoint", e);
                let limited = self.health_probe().await;
                let fallback = if limited {
                    BotStatus::limited()
                } else {
                    BotStatus::offline()
                };
                serde_json::to_value(fallback).unwrap_or_default()
            }
        }
    }

    /// True when the unauthenticated health endpoint answers with a body that
    /// looks like a running bot.
    async fn health_probe(&self) -> bool {
        let response = match self.client.get(self.url("/health")).send().await {
            Ok(r) if r.status().is_success() => r,
            _ => return false,
        };
        match response.text().await {
            Ok(text) => text.contains("running"),
            Err(_) => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        let api = BotApi::new("http://bot.example//", "s3cret");
        assert_eq!(api.url("/api/status"), "http://bot.example/api/status");
    }

    #[tokio::test]
    async fn status_degrades_to_offline_when_unreachable() {
        // Port 9 (discard) refuses connections immediately.
        let api = BotApi::new("http://127.0.0.1:9", "s3cret");
        let status = api.status().await;
        assert_eq!(status["online"], serde_json::json!(false));
        assert_eq!(status["serverCount"], serde_json::json!(0));
        assert_eq!(status["userCount"], serde_json::json!(0));
        assert_eq!(status["error"], serde_json::json!("Bot API unavailable"));
    }

    #[tokio::test]
    async fn submit_surfaces_transport_failure() {
        let api = BotApi::new("http://127.0.0.1:9", "s3cret");
        let err = api
            .submit("/api/broadcast", &serde_json::json!({"message": "hi"}))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }
}
