//! Proxy endpoints that forward dashboard actions to the upstream bot API
//! and normalize the result into the `{success, message, data}` envelope.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::info;

use moddeck_types::{
    ActionEnvelope, AnnouncementRequest, ApplicationStats, BotCommand, BotConfig,
    BroadcastRequest, FieldError, ModerationRequest, QotdRequest, UpdateConfigRequest, Validate,
};

use crate::AppState;
use crate::error::ApiError;
use crate::sessions::Session;

/// GET /api/health — liveness probe for deployment monitoring; no auth.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": state.started_at.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/bot/status — bot status, degrading to offline when unreachable.
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(state.bot.status().await)
}

/// GET /api/bot/commands — the bot's command catalogue. Served locally; the
/// catalogue changes with bot releases, not at runtime.
pub async fn commands() -> Json<Value> {
    let commands: Vec<BotCommand> = [
        ("management", "Display the server management team", "utils"),
        ("warn", "Warn a member", "moderation"),
        ("kick", "Kick a member from the server", "moderation"),
        ("ban", "Ban a member from the server", "moderation"),
        ("verify", "Link your Discord account with your Roblox account", "roblox"),
        ("get_profile", "Get a user's Roblox profile information", "roblox"),
        ("group_info", "Get information about the community's Roblox group", "roblox"),
        ("create_applications", "Create the application system message", "applications"),
        ("application_stats", "View application statistics", "applications"),
        ("clear_applications", "Clear applications database", "admin"),
        ("qotd", "Send question of the day", "utils"),
        ("announcement", "Send server announcement", "admin"),
    ]
    .into_iter()
    .map(|(name, description, category)| BotCommand {
        name: name.into(),
        description: description.into(),
        category: category.into(),
    })
    .collect();

    Json(json!({ "commands": commands }))
}

/// POST /api/bot/broadcast — send a message through the bot.
pub async fn broadcast(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<ActionEnvelope>, ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    let payload = json!({
        "message": &req.message,
        "channel_id": &req.channel_id,
        "dashboard_user": &session.user.username,
    });

    info!("Forwarding broadcast from {}", session.user.username);
    let bot_response = state
        .bot
        .submit("/api/broadcast", &payload)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to send broadcast message: {e}")))?;

    let message = upstream_message(&bot_response, "Broadcast sent successfully");
    Ok(Json(ActionEnvelope {
        success: true,
        message,
        data: json!({
            "message": &req.message,
            "channel_id": &req.channel_id,
            "sent_by": &session.user.username,
            "timestamp": Utc::now().to_rfc3339(),
            "bot_response": bot_response,
        }),
    }))
}

/// POST /api/bot/moderation — execute a warn/kick/ban through the bot.
pub async fn moderation(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<ModerationRequest>,
) -> Result<Json<ActionEnvelope>, ApiError> {
    req.validate().map_err(ApiError::Validation)?;
    let action = req
        .action
        .ok_or_else(|| ApiError::Validation(vec![FieldError::new("action", "Action is required")]))?;

    let mut payload = serde_json::to_value(&req)
        .map_err(|e| ApiError::Internal(format!("Failed to encode moderation action: {e}")))?;
    payload["dashboard_user"] = json!(&session.user.username);

    info!(
        "Forwarding {} on {} from {}",
        action.as_str(),
        req.user_id,
        session.user.username
    );
    let bot_response = state
        .bot
        .submit("/api/moderation", &payload)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to execute moderation action: {e}")))?;

    let default_message = format!("{} action executed successfully", action.as_str());
    let message = upstream_message(&bot_response, &default_message);
    Ok(Json(ActionEnvelope {
        success: true,
        message,
        data: json!({
            "action": action.as_str(),
            "user_id": &req.user_id,
            "reason": &req.reason,
            "delete_days": &req.delete_days,
            "executed_by": &session.user.username,
            "timestamp": Utc::now().to_rfc3339(),
            "bot_response": bot_response,
        }),
    }))
}

/// POST /api/bot/qotd — send a question of the day.
pub async fn qotd(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<QotdRequest>,
) -> Result<Json<ActionEnvelope>, ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    let payload = json!({
        "question": &req.question,
        "channel_id": &req.channel_id,
        "dashboard_user": &session.user.username,
    });

    let bot_response = state
        .bot
        .submit("/api/qotd", &payload)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to send QOTD: {e}")))?;

    let message = upstream_message(&bot_response, "QOTD sent successfully");
    Ok(Json(ActionEnvelope {
        success: true,
        message,
        data: json!({
            "question": &req.question,
            "channel_id": &req.channel_id,
            "sent_by": &session.user.username,
            "timestamp": Utc::now().to_rfc3339(),
            "bot_response": bot_response,
        }),
    }))
}

/// POST /api/bot/announcement — send a formatted server announcement.
pub async fn announcement(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<AnnouncementRequest>,
) -> Result<Json<ActionEnvelope>, ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    let payload = json!({
        "title": &req.title,
        "content": &req.content,
        "channel_id": &req.channel_id,
        "dashboard_user": &session.user.username,
    });

    let bot_response = state
        .bot
        .submit("/api/announcement", &payload)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to send announcement: {e}")))?;

    let message = upstream_message(&bot_response, "Announcement sent successfully");
    Ok(Json(ActionEnvelope {
        success: true,
        message,
        data: json!({
            "title": &req.title,
            "content": &req.content,
            "channel_id": &req.channel_id,
            "sent_by": &session.user.username,
            "timestamp": Utc::now().to_rfc3339(),
            "bot_response": bot_response,
        }),
    }))
}

/// GET /api/bot/config — bot configuration, with hardcoded defaults when the
/// bot is unreachable so the config panel still renders.
pub async fn get_config(State(state): State<AppState>) -> Json<Value> {
    let fallback = serde_json::to_value(BotConfig::unavailable()).unwrap_or_default();
    Json(state.bot.fetch_or("/api/config", fallback).await)
}

/// POST /api/bot/config — forward a config update; failures are surfaced.
pub async fn set_config(
    State(state): State<AppState>,
    Json(req): Json<UpdateConfigRequest>,
) -> Result<Json<Value>, ApiError> {
    let payload = serde_json::to_value(&req)
        .map_err(|e| ApiError::Internal(format!("Failed to encode configuration: {e}")))?;

    let result = state
        .bot
        .submit("/api/config", &payload)
        .await
        .map_err(|_| ApiError::Internal("Failed to update configuration".into()))?;

    Ok(Json(result))
}

/// GET /api/bot/applications — application statistics, degraded to zeroes
/// when the bot is unreachable.
pub async fn applications(State(state): State<AppState>) -> Json<Value> {
    let fallback = serde_json::to_value(ApplicationStats::unavailable()).unwrap_or_default();
    Json(state.bot.fetch_or("/api/applications", fallback).await)
}

/// GET /api/bot/roblox/{discord_id} — look up the Roblox profile linked to a
/// Discord account. Both "not linked" and "bot down" read as 404 here.
pub async fn roblox_profile(
    State(state): State<AppState>,
    Path(discord_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .bot
        .fetch(&format!("/api/roblox/{discord_id}"))
        .await
        .map(Json)
        .map_err(|_| ApiError::NotFound("Roblox profile not found or bot unavailable".into()))
}

/// The upstream's own message when it provides one, else the default.
fn upstream_message(bot_response: &Value, default: &str) -> String {
    bot_response
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or(default)
        .to_string()
}
