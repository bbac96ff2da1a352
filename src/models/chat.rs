// Chat Models - transcript messages exchanged with the intelligence assistant

use super::intelligence::IntelligencePayload;
use crate::utils::{generate_id, iso_millis, now_millis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Sender Enum
// ============================================================================

/// Who authored a chat message.
/// Serializes/deserializes as lowercase strings to match the stored transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "assistant" => Ok(Sender::Assistant),
            _ => Err(format!(
                "Invalid message sender: '{}'. Expected 'user' or 'assistant'",
                s
            )),
        }
    }
}

// ============================================================================
// Chat Message
// ============================================================================

/// A message in the conversation transcript.
///
/// Messages are immutable once appended; the ordered transcript is the
/// authoritative event log the dashboard can be rebuilt from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    /// Normalized analysis produced for this turn, if the turn triggered one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_intelligence: Option<IntelligencePayload>,
}

impl ChatMessage {
    /// A user-authored message stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            content: content.into(),
            sender: Sender::User,
            timestamp: now_millis(),
            attached_intelligence: None,
        }
    }

    /// An assistant message stamped now, optionally carrying an analysis.
    pub fn assistant(content: impl Into<String>, intelligence: Option<IntelligencePayload>) -> Self {
        Self {
            id: generate_id(),
            content: content.into(),
            sender: Sender::Assistant,
            timestamp: now_millis(),
            attached_intelligence: intelligence,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn has_intelligence(&self) -> bool {
        self.attached_intelligence.is_some()
    }
}
