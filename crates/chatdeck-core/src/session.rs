use crate::message::{Message, Sender};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Title every session starts with until it is derived or renamed.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Titles and previews are cut to this many characters.
pub const TITLE_MAX_CHARS: usize = 30;

/// Identifier of a [`Session`]: `chat_<unix-millis>_<9 random chars>`.
///
/// Collisions are possible in principle; nothing checks for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh id stamped with the current time.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("chat_{}_{}", Utc::now().timestamp_millis(), &suffix[..9]))
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Also the key the session is stored under.
    pub id: SessionId,
    /// Display title; starts as [`DEFAULT_TITLE`].
    pub title: String,
    /// Transcript, oldest first. Append-only.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Set once when the session is created.
    pub created_at: DateTime<Utc>,
    /// Bumped on every mutation; drives recency ordering.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates an empty session titled [`DEFAULT_TITLE`].
    pub fn new() -> Self {
        Self::with_id(SessionId::generate())
    }

    /// An empty session under a caller-chosen id.
    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a message, bumps `updated_at`, and derives the title from the
    /// first user message while the title is still the default.
    pub fn add_message(&mut self, message: Message) {
        let first_user = message.sender == Sender::User && !self.has_user_message();
        if first_user && self.title == DEFAULT_TITLE {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
        self.touch();
    }

    /// Replaces the title and bumps `updated_at`.
    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Moves `updated_at` forward. Strictly increasing even when the clock
    /// has not advanced since the previous mutation.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }

    /// Number of messages in the transcript.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Whether any message came from the user.
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(Message::is_user)
    }

    /// Short preview of the first message, or `"New chat"` when empty.
    pub fn preview(&self) -> String {
        self.messages
            .first()
            .map(|m| truncate_chars(&m.content, TITLE_MAX_CHARS))
            .unwrap_or_else(|| "New chat".to_string())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Title for a session whose first user message is `content`.
pub fn derive_title(content: &str) -> String {
    truncate_chars(content, TITLE_MAX_CHARS)
}

/// Keeps the first `max` characters, appending `"..."` when anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new();
        assert_eq!(session.title, DEFAULT_TITLE);
        assert!(session.messages.is_empty());
        assert_eq!(session.created_at, session.updated_at);
        assert!(session.id.as_str().starts_with("chat_"));
    }

    #[test]
    fn test_id_shape() {
        let id = SessionId::generate();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "chat");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn test_long_first_message_is_truncated_into_title() {
        let mut session = Session::new();
        session.add_message(Message::user("Explain quicksort in detail please"));
        assert_eq!(session.title, "Explain quicksort in detail pl...");
    }

    #[test]
    fn test_short_first_message_becomes_title() {
        let mut session = Session::new();
        session.add_message(Message::user("Hi"));
        assert_eq!(session.title, "Hi");
    }

    #[test]
    fn test_exactly_thirty_chars_is_not_truncated() {
        let text = "a".repeat(30);
        assert_eq!(derive_title(&text), text);
        assert_eq!(derive_title(&"a".repeat(31)), format!("{}...", "a".repeat(30)));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(31);
        assert_eq!(truncate_chars(&text, 30), format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn test_title_only_derived_from_first_user_message() {
        let mut session = Session::new();
        session.add_message(Message::assistant("Welcome!"));
        assert_eq!(session.title, DEFAULT_TITLE);
        session.add_message(Message::user("First question"));
        session.add_message(Message::user("Second question"));
        assert_eq!(session.title, "First question");
    }

    #[test]
    fn test_renamed_title_is_kept() {
        let mut session = Session::new();
        session.rename("Sorting notes");
        session.add_message(Message::user("Explain quicksort"));
        assert_eq!(session.title, "Sorting notes");
    }

    #[test]
    fn test_updated_at_strictly_increases() {
        let mut session = Session::new();
        let mut last = session.updated_at;
        for i in 0..50 {
            session.add_message(Message::user(format!("message {i}")));
            assert!(session.updated_at > last);
            last = session.updated_at;
        }
    }

    #[test]
    fn test_preview() {
        let mut session = Session::new();
        assert_eq!(session.preview(), "New chat");
        session.add_message(Message::user("How do I center a div in a flex container?"));
        assert_eq!(session.preview(), "How do I center a div in a fle...");
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let session = Session::new();
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json["id"].is_string());
    }
}
