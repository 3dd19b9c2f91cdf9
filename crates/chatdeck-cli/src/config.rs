//! `chatdeck.toml` loading.
//!
//! Every section and field is optional; a missing file yields the defaults.

use chatdeck_agent::ChatConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable that overrides `[endpoint] base_url`.
pub const BASE_URL_ENV: &str = "CHATDECK_BASE_URL";

/// Contents of `chatdeck.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatdeckConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Base url of the completion endpoint, without `/chat`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// How many prior messages go out with each request.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            history_window: default_history_window(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per storage key.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    /// Prefix of every storage key and export file name.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            namespace: default_namespace(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Name the assistant greets.
    #[serde(default = "default_user_name")]
    pub name: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: default_user_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

/// External commands backing `/speak` and `/listen`. Unset means unsupported.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechConfig {
    /// Program that reads text from its arguments aloud.
    #[serde(default)]
    pub tts_command: Option<String>,
    #[serde(default)]
    pub tts_args: Vec<String>,
    /// Program that prints one transcribed utterance to stdout.
    #[serde(default)]
    pub stt_command: Option<String>,
    #[serde(default)]
    pub stt_args: Vec<String>,
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}
fn default_history_window() -> usize {
    10
}
fn default_storage_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_namespace() -> String {
    "chatdeck".to_string()
}
fn default_user_name() -> String {
    "Legend".to_string()
}
fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ChatdeckConfig {
    /// Reads `path`, or returns the defaults when it does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {}", path.display(), e))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Applies the endpoint overrides. The command-line flag beats the
    /// environment, which beats the file.
    pub fn override_base_url(&mut self, from_env: Option<String>, from_flag: Option<String>) {
        if let Some(url) = from_flag.or(from_env).filter(|u| !u.trim().is_empty()) {
            self.endpoint.base_url = url;
        }
    }

    /// Settings the completion controller needs.
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            base_url: self.endpoint.base_url.clone(),
            history_window: self.endpoint.history_window,
            user_name: self.user.name.clone(),
        }
    }
}
