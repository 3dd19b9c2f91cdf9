//! Core types and error definitions for chatdeck.
//!
//! This crate provides the foundational types shared across all chatdeck
//! crates: the error enum, transcript messages, and session records.
//!
//! # Main types
//!
//! - [`ChatdeckError`] — Unified error enum for all chatdeck subsystems.
//! - [`ChatdeckResult`] — Convenience alias for `Result<T, ChatdeckError>`.
//! - [`Sender`] — Message author (user or assistant).
//! - [`Message`] — A single entry of a session transcript.
//! - [`Session`] — One conversation thread with its title and timestamps.

/// Error enum and result alias.
pub mod error;
/// Transcript messages.
pub mod message;
/// Session records and title helpers.
pub mod session;

pub use error::{ChatdeckError, ChatdeckResult};
pub use message::{Message, Sender, CONTENT_PLACEHOLDER};
pub use session::{
    derive_title, truncate_chars, Session, SessionId, DEFAULT_TITLE, TITLE_MAX_CHARS,
};
