//! # Wire models
//!
//! Data structures exchanged with the dashboard backend over its REST API.
//!
//! These are plain serde types; the backend owns all persistence. Unknown
//! fields are ignored on deserialize so the client tolerates additive
//! server-side changes, and optional fields default to `None` because the
//! backend omits them freely (counters on a freshly created chatbot, the
//! denormalized last-message fields on a session, and so on).
//!
//! ## Entities
//! - [`Chatbot`]: a configured assistant owned by the logged-in user.
//! - [`KnowledgeDocument`]: one uploaded file backing a chatbot's knowledge base.
//! - [`ChatSession`]: a server-assigned grouping of chat turns.
//! - [`ChatTurn`]: one user or assistant message within a session.
//! - [`TokenGrant`] / [`UserProfile`]: authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display profile cached alongside the token to avoid redundant
/// `/users/me` fetches. Best-effort only; never authoritative.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserProfile {
    /// Preferred display name: username when present, email otherwise.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("(unknown)")
    }
}

/// Response to the password-grant token exchange.
///
/// `access_token` is optional on purpose: a server that answers 200 without
/// a token must leave the credential store empty (the login flow checks).
#[derive(Deserialize, Debug, Clone)]
pub struct TokenGrant {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A configured assistant instance.
#[derive(Deserialize, Debug, Clone)]
pub struct Chatbot {
    #[serde(alias = "chatbot_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub about_business: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Aggregate counters maintained server-side.
    #[serde(default)]
    pub message_count: Option<u64>,
    #[serde(default)]
    pub impression_count: Option<u64>,
}

/// Form fields for chatbot create and update.
///
/// Create requires the first three; `system_prompt` only travels on update.
#[derive(Debug, Clone, Default)]
pub struct ChatbotDraft {
    pub name: String,
    pub business_name: String,
    pub about_business: String,
    pub system_prompt: Option<String>,
}

/// Acknowledgement returned by chatbot create.
#[derive(Deserialize, Debug, Clone)]
pub struct CreatedChatbot {
    pub chatbot_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// One uploaded file in a chatbot's knowledge base.
#[derive(Deserialize, Debug, Clone)]
pub struct KnowledgeDocument {
    #[serde(alias = "file_id")]
    pub id: String,
    #[serde(alias = "filename")]
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub chatbot_id: Option<String>,
}

/// A conversation grouping, created implicitly by the first message sent
/// without a session id.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatSession {
    #[serde(alias = "session_id")]
    pub id: String,
    #[serde(default)]
    pub chatbot_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Sender of a [`ChatTurn`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn in a conversation, as listed by `/messages`.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatTurn {
    #[serde(alias = "message_id")]
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Reply to a chat send: the full answer plus the session id the server
/// filed the exchange under.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatReply {
    pub answer: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chatbot_tolerates_missing_optionals_and_id_alias() {
        let bot: Chatbot =
            serde_json::from_str(r#"{"chatbot_id":"b1","name":"Bot1"}"#).unwrap();
        assert_eq!(bot.id, "b1");
        assert_eq!(bot.name, "Bot1");
        assert!(bot.message_count.is_none());
    }

    #[test]
    fn token_grant_without_access_token_deserializes() {
        let grant: TokenGrant = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert!(grant.access_token.is_none());
        assert_eq!(grant.username.as_deref(), Some("alice"));
    }

    #[test]
    fn role_round_trips_lowercase() {
        let turn: ChatTurn = serde_json::from_str(
            r#"{"id":"m1","role":"assistant","content":"hi"}"#,
        )
        .unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[test]
    fn profile_display_name_prefers_username() {
        let p = UserProfile {
            username: Some("alice".into()),
            email: Some("alice@x.com".into()),
        };
        assert_eq!(p.display_name(), "alice");
        let p = UserProfile { username: None, email: Some("alice@x.com".into()) };
        assert_eq!(p.display_name(), "alice@x.com");
    }
}
