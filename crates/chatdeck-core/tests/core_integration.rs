#![allow(clippy::unwrap_used, clippy::expect_used)]

use chatdeck_core::*;

// ---------------------------------------------------------------------------
// 1. Session serialization roundtrip
// ---------------------------------------------------------------------------

#[test]
fn session_serialization_roundtrip() {
    let mut session = Session::new();
    session.add_message(Message::user("Explain quicksort"));
    session.add_message(Message::assistant("Pick a pivot, partition, recurse.\n\n```rust\nfn qs() {}\n```"));
    session.add_message(Message::user("Quotes \"inside\" and 'single' too"));

    let json = serde_json::to_string(&session).unwrap();
    let deserialized: Session = serde_json::from_str(&json).unwrap();

    assert_eq!(deserialized, session);
    assert_eq!(deserialized.messages.len(), 3);
    assert_eq!(deserialized.messages[2].content, "Quotes \"inside\" and 'single' too");
    assert_eq!(deserialized.updated_at, session.updated_at);
}

// ---------------------------------------------------------------------------
// 2. Legacy records written by older clients
// ---------------------------------------------------------------------------

#[test]
fn legacy_record_with_bot_sender_and_null_content() {
    let json = r#"{
        "id": "chat_1700000000000_abc123def",
        "title": "New Chat",
        "messages": [
            {"sender": "user", "content": "hello", "timestamp": "2024-11-14T22:13:20Z"},
            {"sender": "bot", "content": null, "timestamp": "2024-11-14T22:13:21Z"}
        ],
        "createdAt": "2024-11-14T22:13:20Z",
        "updatedAt": "2024-11-14T22:13:21Z"
    }"#;

    let session: Session = serde_json::from_str(json).unwrap();
    assert_eq!(session.id.as_str(), "chat_1700000000000_abc123def");
    assert_eq!(session.messages[1].sender, Sender::Assistant);
    assert_eq!(session.messages[1].content, CONTENT_PLACEHOLDER);
}

#[test]
fn record_without_messages_field_is_empty() {
    let json = r#"{
        "id": "chat_1_x",
        "title": "Empty",
        "createdAt": "2024-11-14T22:13:20Z",
        "updatedAt": "2024-11-14T22:13:20Z"
    }"#;
    let session: Session = serde_json::from_str(json).unwrap();
    assert!(session.messages.is_empty());
}

// ---------------------------------------------------------------------------
// 3. Error Display and From impls
// ---------------------------------------------------------------------------

#[test]
fn error_display_and_from_impls() {
    let upstream = ChatdeckError::Upstream {
        status: 429,
        message: "Rate limit exceeded".to_string(),
    };
    assert_eq!(upstream.to_string(), "Upstream error 429: Rate limit exceeded");
    assert_eq!(upstream.status(), Some(429));

    let network = ChatdeckError::Network("connection refused".to_string());
    assert_eq!(network.to_string(), "Network error: connection refused");
    assert_eq!(network.status(), None);

    let session_err = ChatdeckError::Session("not found".to_string());
    assert_eq!(session_err.to_string(), "Session error: not found");

    let bad_json = serde_json::from_str::<serde_json::Value>("not json");
    let err: ChatdeckError = bad_json.unwrap_err().into();
    assert!(err.to_string().starts_with("Serialization error:"));

    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err: ChatdeckError = io_err.into();
    assert!(err.to_string().starts_with("IO error:"));
}

// ---------------------------------------------------------------------------
// 4. Append-only transcript
// ---------------------------------------------------------------------------

#[test]
fn appending_keeps_prior_messages_untouched() {
    let mut session = Session::new();
    session.add_message(Message::user("one"));
    session.add_message(Message::assistant("two"));
    let before = session.messages.clone();
    let updated_before = session.updated_at;

    session.add_message(Message::user("three"));

    assert_eq!(&session.messages[..2], &before[..]);
    assert_eq!(session.messages[2].content, "three");
    assert!(session.updated_at > updated_before);
}

// ---------------------------------------------------------------------------
// 5. SessionId conversions
// ---------------------------------------------------------------------------

#[test]
fn session_id_conversions() {
    let id = SessionId::from("chat_42_abcdefghi");
    assert_eq!(id.to_string(), "chat_42_abcdefghi");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"chat_42_abcdefghi\"");

    let a = SessionId::generate();
    let b = SessionId::generate();
    assert_ne!(a, b);
}
