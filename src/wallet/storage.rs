//! Persistence port for the wallet record
//!
//! The repository owns a single key-value slot; absence of the slot
//! means "no wallet". The port keeps the repository testable without a
//! real backend and lets the host platform supply its own storage.

use crate::error::WalletError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Async key-value persistence. Implementations must make `set` atomic
/// with respect to concurrent `get`s: a reader sees the old value or
/// the new one, never a torn write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, WalletError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), WalletError>;
    async fn delete(&self, key: &str) -> Result<(), WalletError>;
}

/// In-memory store for tests and ephemeral embeddings.
#[derive(Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, WalletError> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
        self.slots
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), WalletError> {
        self.slots.write().await.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON file per key under a directory.
/// Writes go through a temp file and rename, so readers never observe
/// a partial record.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, WalletError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WalletError::Storage(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), WalletError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), WalletError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WalletError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.get("wallet").await.unwrap(), None);

        store.set("wallet", "{\"v\":1}").await.unwrap();
        assert_eq!(store.get("wallet").await.unwrap().as_deref(), Some("{\"v\":1}"));

        store.delete("wallet").await.unwrap();
        assert_eq!(store.get("wallet").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.delete("wallet").await.unwrap();
        store.delete("wallet").await.unwrap();
    }

    #[tokio::test]
    async fn file_store_round_trips() {
        let dir = std::env::temp_dir().join(format!("tonpocket-store-{}", std::process::id()));
        let store = FileStore::new(&dir);

        assert_eq!(store.get("wallet").await.unwrap(), None);
        store.set("wallet", "payload").await.unwrap();
        assert_eq!(store.get("wallet").await.unwrap().as_deref(), Some("payload"));

        // Overwrite replaces wholesale
        store.set("wallet", "replaced").await.unwrap();
        assert_eq!(store.get("wallet").await.unwrap().as_deref(), Some("replaced"));

        store.delete("wallet").await.unwrap();
        store.delete("wallet").await.unwrap();
        assert_eq!(store.get("wallet").await.unwrap(), None);

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
