use serde::{Deserialize, Serialize};

/// Settings for talking to the completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Root of the completion service; requests go to `{base_url}/chat`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// How many trailing transcript messages travel with each request.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Name the fallback responder addresses the user by.
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_history_window() -> usize {
    10
}

fn default_user_name() -> String {
    "Legend".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            history_window: default_history_window(),
            user_name: default_user_name(),
        }
    }
}

impl ChatConfig {
    /// `{base_url}/chat`, tolerating a trailing slash on the base.
    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url.trim_end_matches('/'))
    }
}
