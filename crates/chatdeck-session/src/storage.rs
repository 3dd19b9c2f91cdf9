use crate::store::KvStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

const PROBE_KEY: &str = "__chatdeck_probe__";

/// Namespaced names of every key the client persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Every session record, keyed by id.
    pub sessions: String,
    /// Id of the current session.
    pub current: String,
    /// The user profile.
    pub user_data: String,
    /// The selected theme.
    pub theme: String,
}

impl StorageKeys {
    /// Keys prefixed with `<namespace>_`.
    pub fn new(namespace: &str) -> Self {
        Self {
            sessions: format!("{namespace}_chat_sessions"),
            current: format!("{namespace}_current_chat"),
            user_data: format!("{namespace}_user_data"),
            theme: format!("{namespace}_theme"),
        }
    }

    /// Every key, for clearing.
    pub fn all(&self) -> [&str; 4] {
        [
            self.sessions.as_str(),
            self.current.as_str(),
            self.user_data.as_str(),
            self.theme.as_str(),
        ]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new("chatdeck")
    }
}

/// JSON adapter over a [`KvStore`] that never fails.
///
/// The store is probed once when opened. If the probe fails every operation
/// becomes a no-op: reads return the caller's default, writes return `false`.
/// Decode and write failures are logged and swallowed.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn KvStore>,
    available: bool,
}

impl Storage {
    /// Wraps `store`, probing it once to decide availability.
    pub async fn open(store: Arc<dyn KvStore>) -> Self {
        let available = match probe(store.as_ref()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Persistent storage unavailable, data will not persist");
                false
            }
        };
        Self { store, available }
    }

    /// Whether the probe on open succeeded.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Reads and decodes `key`, falling back to `default` when the key is
    /// missing, empty, unreadable, or not valid JSON for `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        if !self.available {
            return default;
        }
        let raw = match self.store.read(key).await {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return default,
            Err(e) => {
                warn!(key, error = %e, "Error reading from storage");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Error decoding stored value, using default");
                default
            }
        }
    }

    /// Encodes and writes `value`. Returns `false` on any failure.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        if !self.available {
            debug!(key, "Storage unavailable, keeping value in memory only");
            return false;
        }
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(key, error = %e, "Error encoding value for storage");
                return false;
            }
        };
        match self.store.write(key, &encoded).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Error writing to storage");
                false
            }
        }
    }

    /// Deletes `key`. Returns `false` on any failure.
    pub async fn remove(&self, key: &str) -> bool {
        if !self.available {
            return false;
        }
        match self.store.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Error removing from storage");
                false
            }
        }
    }

    /// Removes every key in `keys`. Returns `false` if any removal failed.
    pub async fn clear(&self, keys: &[&str]) -> bool {
        if !self.available {
            return false;
        }
        let mut ok = true;
        for key in keys {
            ok &= self.remove(key).await;
        }
        ok
    }
}

async fn probe(store: &dyn KvStore) -> chatdeck_core::ChatdeckResult<()> {
    store.write(PROBE_KEY, "\"probe\"").await?;
    store.delete(PROBE_KEY).await
}
