//! Conversation and turn types persisted by the chat store.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnRole {
    User,
    Assistant,
    System,
}

impl TurnRole {
    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "usuario",
            Self::Assistant => "asistente",
            Self::System => "sistema",
        }
    }

    pub fn from_stored(raw: &str) -> Option<Self> {
        match raw {
            "usuario" => Some(Self::User),
            "asistente" => Some(Self::Assistant),
            "sistema" => Some(Self::System),
            _ => None,
        }
    }

    /// Role name on the chat-completion wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// Analysis metadata attached to a stored turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnMetadata {
    pub tokens_used: Option<u32>,
    pub latency_seconds: Option<f64>,
    pub consulted_ids: Vec<i64>,
    pub extracted_entities: Vec<String>,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: i64,
    pub role: TurnRole,
    pub content: String,
    /// ISO 8601 timestamp string.
    pub sent_at: String,
    pub metadata: TurnMetadata,
}

/// A user's chat thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub active: bool,
    /// ISO 8601 timestamp string.
    pub created_at: String,
    /// ISO 8601 timestamp string.
    pub updated_at: String,
}

/// Title for a conversation opened implicitly by its first question.
pub fn derive_title(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() > max_chars {
        let head: String = trimmed.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
