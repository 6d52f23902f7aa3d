use serde::{Deserialize, Serialize};

use crate::models::Role;

// -- Validation --

/// One field-level violation, reported in the `errors` list of a 400 body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Request-body validation, checked by handlers before anything is forwarded
/// upstream. All violations are collected, not just the first.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

fn require(errors: &mut Vec<FieldError>, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, message));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// -- Auth --

// Required string fields deserialize with `#[serde(default)]` so a missing
// field reads as empty and is reported through `Validate` as a field error
// instead of a serde rejection.

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "username", &self.username, "Username is required");
        require(&mut errors, "password", &self.password, "Password is required");
        finish(errors)
    }
}

// -- User management --

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "username", &self.username, "Username is required");
        if self.password.len() < 6 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters",
            ));
        }
        finish(errors)
    }
}

// -- Bot actions --

#[derive(Debug, Serialize, Deserialize)]
pub struct BroadcastRequest {
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl Validate for BroadcastRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "message", &self.message, "Message is required");
        finish(errors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Warn,
    Kick,
    Ban,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Warn => "warn",
            ModerationAction::Kick => "kick",
            ModerationAction::Ban => "ban",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModerationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ModerationAction>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_violations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_days: Option<u8>,
}

impl Validate for ModerationRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.action.is_none() {
            errors.push(FieldError::new("action", "Action is required"));
        }
        require(&mut errors, "user_id", &self.user_id, "User ID is required");
        require(&mut errors, "reason", &self.reason, "Reason is required");
        if let Some(days) = self.delete_days {
            if days > 7 {
                errors.push(FieldError::new(
                    "delete_days",
                    "Delete days must be between 0 and 7",
                ));
            }
        }
        finish(errors)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QotdRequest {
    #[serde(default)]
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl Validate for QotdRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "question", &self.question, "Question is required");
        finish(errors)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnnouncementRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl Validate for AnnouncementRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "title", &self.title, "Title is required");
        require(&mut errors, "content", &self.content, "Content is required");
        finish(errors)
    }
}

/// Partial config update; only the provided fields are forwarded to the bot.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qotd_channels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement_channels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qotd_message_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub announcement_style: Option<String>,
}

// -- Proxy envelope --

/// Normalized shape returned by every action proxy endpoint, regardless of
/// what the upstream bot API natively responds with. `data` carries the
/// echoed input fields, the acting dashboard user, a timestamp, and the raw
/// upstream body under `bot_response`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub success: bool,
    pub message: String,
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_rejects_blank_fields() {
        let req = LoginRequest {
            username: "  ".into(),
            password: String::new(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "username");
        assert_eq!(errors[1].field, "password");
    }

    #[test]
    fn create_user_requires_six_char_password() {
        let req = CreateUserRequest {
            username: "mod1".into(),
            password: "short".into(),
            role: Role::User,
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::new(
            "password",
            "Password must be at least 6 characters",
        )]);

        let req = CreateUserRequest {
            username: "mod1".into(),
            password: "longenough".into(),
            role: Role::Admin,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_user_role_defaults_to_user() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"username":"mod1","password":"secret1"}"#).unwrap();
        assert_eq!(req.role, Role::User);
    }

    #[test]
    fn moderation_bounds_delete_days() {
        let req = ModerationRequest {
            action: Some(ModerationAction::Ban),
            user_id: "123".into(),
            reason: "spam".into(),
            rule_violations: None,
            delete_days: Some(8),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors[0].field, "delete_days");

        let req = ModerationRequest {
            delete_days: Some(7),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn moderation_action_parses_lowercase() {
        let req: ModerationRequest = serde_json::from_str(
            r#"{"action":"kick","user_id":"42","reason":"rule 3"}"#,
        )
        .unwrap();
        assert_eq!(req.action, Some(ModerationAction::Kick));
        assert!(serde_json::from_str::<ModerationRequest>(
            r#"{"action":"nuke","user_id":"42","reason":"x"}"#
        )
        .is_err());
    }

    #[test]
    fn missing_fields_deserialize_and_fail_validation() {
        // An empty body is well-formed JSON; absence must surface as field
        // errors, not a deserialization rejection.
        let req: BroadcastRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.validate().unwrap_err()[0].field, "message");

        let req: ModerationRequest = serde_json::from_str("{}").unwrap();
        let fields: Vec<_> = req
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["action", "user_id", "reason"]);

        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.validate().unwrap_err().len(), 2);

        let req: CreateUserRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn broadcast_collects_blank_message() {
        let req = BroadcastRequest {
            message: String::new(),
            channel_id: Some("general".into()),
        };
        assert_eq!(req.validate().unwrap_err()[0].field, "message");
    }

    #[test]
    fn announcement_requires_title_and_content() {
        let req = AnnouncementRequest {
            title: String::new(),
            content: String::new(),
            channel_id: None,
        };
        assert_eq!(req.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn config_update_skips_missing_fields() {
        let update = UpdateConfigRequest {
            qotd_channels: None,
            announcement_channels: None,
            qotd_message_style: Some("Retro".into()),
            announcement_style: None,
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"qotd_message_style": "Retro"})
        );
    }
}
