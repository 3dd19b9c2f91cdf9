use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Stored in place of message content that is absent or null.
pub const CONTENT_PLACEHOLDER: &str = "Message content unavailable";

/// Who authored a [`Message`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The human at the keyboard.
    User,
    /// The completion service, or the local fallback responder.
    #[serde(alias = "bot")]
    Assistant,
}

/// A single message within a session transcript.
///
/// Messages are immutable once appended; the transcript only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// The author of the message.
    pub sender: Sender,
    /// The textual content. Never absent; see [`CONTENT_PLACEHOLDER`].
    #[serde(default = "placeholder", deserialize_with = "content_or_placeholder")]
    pub content: String,
    /// UTC timestamp of when the message was created.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a new message stamped with the current time.
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a new message from possibly-missing content, substituting
    /// [`CONTENT_PLACEHOLDER`] when there is none.
    pub fn from_optional(sender: Sender, content: Option<String>) -> Self {
        Self::new(sender, content.unwrap_or_else(placeholder))
    }

    /// Creates a new message with [`Sender::User`].
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    /// Creates a new message with [`Sender::Assistant`].
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }

    /// Whether the user wrote this message.
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

fn placeholder() -> String {
    CONTENT_PLACEHOLDER.to_string()
}

fn content_or_placeholder<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let content = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match content {
        None | Some(serde_json::Value::Null) => placeholder(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}
