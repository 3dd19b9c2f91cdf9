//! Completion requests for chatdeck.
//!
//! The [`ChatController`] owns the session repository and issues at most one
//! request at a time through a [`CompletionBackend`]. Failed requests are
//! classified into a [`FailureKind`] and answered by the local
//! [`FallbackResponder`].

/// Transport to the completion endpoint.
pub mod backends;
/// Request body and reply parsing.
pub mod completion;
/// Controller settings.
pub mod config;
/// The send flow.
pub mod controller;
/// Failure classification and user-facing prefixes.
pub mod failure;
/// Offline keyword responder.
pub mod fallback;

pub use backends::http::HttpCompletionBackend;
pub use backends::CompletionBackend;
pub use completion::{parse_reply, CompletionRequest, MISSING_REPLY};
pub use config::ChatConfig;
pub use controller::{
    ActivityIndicator, ChatController, NoopIndicator, ReplySource, RequestState, SendOutcome,
};
pub use failure::FailureKind;
pub use fallback::{FallbackResponder, Topic};
