//! Wire types exchanged with the Pawfect backend
//!
//! Field names follow the backend's camelCase JSON. Timestamps arrive as
//! ISO-8601 local date-times without an offset; values carrying an offset are
//! accepted as well and normalised to UTC.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Written by the signed-in user
    User,
    /// Produced by the assistant
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single role-tagged chat message
///
/// # Examples
///
/// ```
/// use pawfect::api::{Message, Role};
///
/// let msg = Message::user("My dog has been vomiting");
/// assert_eq!(msg.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message author
    pub role: Role,
    /// Markdown text
    pub content: String,
}

impl Message {
    /// Creates a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Identity of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
}

/// Persisted conversation metadata shown in the summary list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Server-assigned identifier
    pub id: String,
    /// Title derived by the server from the first message
    pub title: String,
    /// Creation time
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    /// Last update time
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

/// Full conversation record including its messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    /// Server-assigned identifier
    pub id: String,
    /// Conversation title
    pub title: String,
    /// Messages in chronological order
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Creation time
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    /// Last update time
    #[serde(with = "timestamp")]
    pub updated_at: NaiveDateTime,
}

/// Body of `POST /api/auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Body of `POST /api/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Response of both auth endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
}

/// Body of `POST /api/chat`
///
/// `conversation_id` serializes as `null` for a new conversation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Full history without any presentation-only messages
    pub messages: Vec<Message>,
    /// Active conversation, absent for a new one
    pub conversation_id: Option<String>,
}

/// Response of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Conversation the exchange was stored in
    pub conversation_id: String,
    /// Assistant reply text
    pub message: String,
}

/// Serde adapter for backend timestamps.
pub(crate) mod timestamp {
    use super::*;

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDateTime, String> {
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Ok(with_offset.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
    }
}
