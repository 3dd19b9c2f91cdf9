/// HTTP backend for `POST {base}/chat`.
pub mod http;

use crate::completion::CompletionRequest;
use async_trait::async_trait;
use chatdeck_core::ChatdeckResult;

/// Trait for completion endpoint backends.
///
/// The controller only ever holds one of these and issues at most one call at
/// a time. Implementations report failures with structured errors:
/// [`chatdeck_core::ChatdeckError::Upstream`] for non-success statuses and
/// [`chatdeck_core::ChatdeckError::Network`] when the endpoint was unreachable.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Sends `request` and returns the reply text.
    async fn complete(&self, request: &CompletionRequest) -> ChatdeckResult<String>;
}
