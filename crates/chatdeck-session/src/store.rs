use async_trait::async_trait;
use chatdeck_core::{ChatdeckError, ChatdeckResult};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Raw persistent key/value medium. Values are opaque strings; encoding
/// lives one layer up in [`crate::Storage`].
#[async_trait]
pub trait KvStore: Send + Sync {
    /// The stored value, or `None` if the key was never written.
    async fn read(&self, key: &str) -> ChatdeckResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    async fn write(&self, key: &str, value: &str) -> ChatdeckResult<()>;
    /// Removes `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> ChatdeckResult<()>;
}

/// File-based store: one `<key>.json` file per key inside a directory.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Uses `dir` as the store root. The directory is created on first write.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn read(&self, key: &str) -> ChatdeckResult<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(path).await?;
        Ok(Some(data))
    }

    async fn write(&self, key: &str, value: &str) -> ChatdeckResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        // Readers see either the previous value or the new one, never a partial write.
        let path = self.key_path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> ChatdeckResult<()> {
        let path = self.key_path(key);
        if path.exists() {
            tokio::fs::remove_file(path).await?;
        }
        Ok(())
    }
}

/// In-memory store. `unavailable()` builds one whose every operation fails.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryKvStore {
    /// An empty, available store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails, like a disabled or full medium.
    pub fn unavailable() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            unavailable: true,
        }
    }

    fn check(&self) -> ChatdeckResult<()> {
        if self.unavailable {
            return Err(ChatdeckError::Storage("store is unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn read(&self, key: &str) -> ChatdeckResult<Option<String>> {
        self.check()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> ChatdeckResult<()> {
        self.check()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> ChatdeckResult<()> {
        self.check()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn file_store_write_read_delete() {
        let tmp = TempDir::new().unwrap();
        let store = FileKvStore::new(tmp.path().join("data"));

        assert_eq!(store.read("theme").await.unwrap(), None);
        store.write("theme", "\"dark\"").await.unwrap();
        assert_eq!(store.read("theme").await.unwrap().as_deref(), Some("\"dark\""));
        assert!(tmp.path().join("data").join("theme.json").exists());
        assert!(!tmp.path().join("data").join("theme.json.tmp").exists());

        store.delete("theme").await.unwrap();
        assert_eq!(store.read("theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_delete_missing_is_ok() {
        let tmp = TempDir::new().unwrap();
        let store = FileKvStore::new(tmp.path().to_path_buf());
        store.delete("nothing").await.unwrap();
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();
        {
            let store = FileKvStore::new(dir.clone());
            store.write("current_chat", "\"chat_1_a\"").await.unwrap();
        }
        let store = FileKvStore::new(dir);
        assert_eq!(
            store.read("current_chat").await.unwrap().as_deref(),
            Some("\"chat_1_a\"")
        );
    }

    #[tokio::test]
    async fn memory_store_unavailable_fails_every_operation() {
        let store = MemoryKvStore::unavailable();
        assert!(store.read("k").await.is_err());
        assert!(store.write("k", "v").await.is_err());
        assert!(store.delete("k").await.is_err());
    }
}
