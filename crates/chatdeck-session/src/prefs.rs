use crate::storage::{Storage, StorageKeys};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display theme, persisted as `"light"` or `"dark"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background, dark text.
    #[default]
    Light,
    /// Dark background, light text.
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

/// What the client remembers about its user between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Name used in greetings and fallback replies.
    pub name: String,
    /// Most recent message that read as a goal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_goal: Option<String>,
    /// Most recent message the user sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_question: Option<String>,
    /// When `last_question` was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// A profile with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_goal: None,
            last_question: None,
            timestamp: None,
        }
    }
}

/// Typed access to the theme and user profile keys.
#[derive(Clone)]
pub struct Preferences {
    storage: Storage,
    keys: StorageKeys,
}

impl Preferences {
    /// Reads and writes through `storage` under `keys`.
    pub fn new(storage: Storage, keys: StorageKeys) -> Self {
        Self { storage, keys }
    }

    /// The stored theme, or the default.
    pub async fn theme(&self) -> Theme {
        self.storage.get(&self.keys.theme, Theme::default()).await
    }

    /// Stores `theme`. Returns `false` if it could not be written.
    pub async fn set_theme(&self, theme: Theme) -> bool {
        self.storage.set(&self.keys.theme, &theme).await
    }

    /// Flips the stored theme and returns the new one.
    pub async fn toggle_theme(&self) -> Theme {
        let theme = self.theme().await.toggled();
        self.set_theme(theme).await;
        theme
    }

    /// The stored profile, or a fresh one carrying `default_name`.
    pub async fn profile(&self, default_name: &str) -> UserProfile {
        self.storage
            .get(&self.keys.user_data, UserProfile::named(default_name))
            .await
    }

    /// Stores `profile`. Returns `false` if it could not be written.
    pub async fn save_profile(&self, profile: &UserProfile) -> bool {
        let saved = self.storage.set(&self.keys.user_data, profile).await;
        if !saved {
            tracing::debug!("User data kept in memory only");
        }
        saved
    }

    /// Records `question` as the latest thing the user asked.
    pub async fn record_question(&self, name: &str, question: &str) -> bool {
        let profile = UserProfile {
            name: name.to_string(),
            last_goal: None,
            last_question: Some(question.to_string()),
            timestamp: Some(Utc::now()),
        };
        self.save_profile(&profile).await
    }
}
