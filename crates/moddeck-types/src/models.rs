use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// A dashboard account as stored on disk. The `password` field holds the
/// argon2 hash, never plaintext — route handlers return [`PublicUser`]
/// projections instead of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Account projection safe to return over the API (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&Account> for PublicUser {
    fn from(account: &Account) -> Self {
        PublicUser {
            id: account.id,
            username: account.username.clone(),
            role: account.role,
            created_at: account.created_at,
            last_login: account.last_login,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "memberCount")]
    pub member_count: u64,
}

/// Bot process status as surfaced to the dashboard. The upstream bot API
/// returns this shape directly; the degrade constructors cover the cases
/// where it cannot be reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatus {
    pub online: bool,
    pub server_count: u64,
    pub user_count: u64,
    pub uptime: String,
    pub last_seen: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guilds: Option<Vec<GuildSummary>>,
}

impl BotStatus {
    /// Fully offline shape returned when both status and health probes fail.
    pub fn offline() -> Self {
        BotStatus {
            online: false,
            server_count: 0,
            user_count: 0,
            uptime: "0%".into(),
            last_seen: Utc::now(),
            message: None,
            error: Some("Bot API unavailable".into()),
            guilds: None,
        }
    }

    /// Minimal online shape inferred from the health endpoint when the full
    /// status endpoint is down.
    pub fn limited() -> Self {
        BotStatus {
            online: true,
            server_count: 1,
            user_count: 100,
            uptime: "Online".into(),
            last_seen: Utc::now(),
            message: Some("Bot connected (limited data)".into()),
            error: None,
            guilds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotCommand {
    pub name: String,
    pub description: String,
    pub category: String,
}

/// Bot-side channel/style configuration. Lives on the bot process; the
/// dashboard only proxies reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub qotd_channels: Vec<String>,
    pub announcement_channels: Vec<String>,
    pub qotd_message_style: String,
    pub announcement_style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BotConfig {
    /// Hardcoded defaults served when the bot API is unreachable, so the
    /// config panel still renders.
    pub fn unavailable() -> Self {
        BotConfig {
            qotd_channels: vec![
                "qotd".into(),
                "question-of-the-day".into(),
                "general".into(),
            ],
            announcement_channels: vec![
                "announcements".into(),
                "news".into(),
                "updates".into(),
                "general".into(),
            ],
            qotd_message_style: "Beach Vibes".into(),
            announcement_style: "Official".into(),
            error: Some("Bot API unavailable".into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub username: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub total: u64,
    pub staff: u64,
    pub security: u64,
    pub recent: Vec<ApplicationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplicationStats {
    pub fn unavailable() -> Self {
        ApplicationStats {
            total: 0,
            staff: 0,
            security: 0,
            recent: Vec::new(),
            error: Some("Bot API unavailable".into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobloxProfile {
    pub roblox_id: String,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_rank: Option<u32>,
}
