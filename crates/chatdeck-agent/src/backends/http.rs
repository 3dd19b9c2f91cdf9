use super::CompletionBackend;
use crate::completion::{parse_reply, CompletionRequest};
use crate::config::ChatConfig;
use async_trait::async_trait;
use chatdeck_core::{ChatdeckError, ChatdeckResult};
use tracing::debug;

/// JSON-over-HTTP backend: `POST {base_url}/chat`.
///
/// No local timeout is applied; the transport's own behaviour decides when a
/// stalled request fails.
pub struct HttpCompletionBackend {
    url: String,
    http: reqwest::Client,
}

impl HttpCompletionBackend {
    /// Posts to `config.chat_url()`.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            url: config.chat_url(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    async fn complete(&self, request: &CompletionRequest) -> ChatdeckResult<String> {
        debug!(
            url = %self.url,
            history = request.history.len(),
            "Sending completion request"
        );

        let resp = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ChatdeckError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            // Best effort: the body usually carries `{"error": "..."}`.
            let message = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body["error"].as_str().map(str::to_string))
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(ChatdeckError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ChatdeckError::Http(format!("Malformed completion response: {e}")))?;

        Ok(parse_reply(&body))
    }
}
