use chatdeck_core::Message;
use serde::Serialize;

/// Reply used when a successful response carries none of the known fields.
pub const MISSING_REPLY: &str =
    "I received your message but couldn't generate a proper response.";

/// Response fields that may carry the reply, in order of preference.
const REPLY_FIELDS: [&str; 3] = ["reply", "response", "message"];

/// Payload of `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// The new user message.
    pub message: String,
    /// Trailing messages of the active transcript, oldest first.
    pub history: Vec<Message>,
}

/// Picks the reply out of a completion response body.
///
/// Takes the first non-empty string among `reply`, `response`, and
/// `message`; anything else yields [`MISSING_REPLY`].
pub fn parse_reply(body: &serde_json::Value) -> String {
    REPLY_FIELDS
        .iter()
        .filter_map(|field| body[field].as_str())
        .find(|text| !text.is_empty())
        .unwrap_or(MISSING_REPLY)
        .to_string()
}
