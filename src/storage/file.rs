//! JSON file backed key-value store
//!
//! All records live in one JSON object. Every write is a read-modify-write of
//! the whole file, serialized within the process by a mutex.

use super::KeyValueStore;
use crate::Result;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// File name used inside a state directory
pub const STORE_FILE_NAME: &str = "storage.json";

/// Key-value store persisted as a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    /// Path to the store file
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store at an explicit file path
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store inside a state directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records; a missing or unreadable file reads as empty
    async fn load(&self) -> Map<String, Value> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store file does not exist: {:?}", self.path);
                return Map::new();
            }
            Err(e) => {
                warn!("Failed to read store file {:?}: {}", self.path, e);
                return Map::new();
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!("Error parsing store file {:?}: {}", self.path, e);
                Map::new()
            }
        }
    }

    async fn save(&self, records: &Map<String, Value>) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self.path.parent()
            && let Err(e) = fs::create_dir_all(parent).await
        {
            error!("Failed to create store directory {:?}: {}", parent, e);
            return Err(crate::Error::storage(
                "directory_creation",
                &format!("Directory creation failed: {}", e),
            ));
        }

        fs::write(&self.path, content).await.map_err(|e| {
            error!("Failed to write store file {:?}: {}", self.path, e);
            crate::Error::storage("file_write", &format!("Write failed: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load().await.remove(key))
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await;
        records.extend(entries);
        self.save(&records).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await;
        let before = records.len();
        for key in keys {
            records.remove(*key);
        }
        if records.len() == before {
            return Ok(());
        }
        self.save(&records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_survive_a_new_handle() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store
            .set_many(vec![("user".to_string(), json!({ "userId": "9" }))])
            .await
            .unwrap();

        let reopened = JsonFileStore::in_dir(dir.path());
        assert_eq!(
            reopened.get("user").await.unwrap(),
            Some(json!({ "userId": "9" }))
        );
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("store.json"));
        assert_eq!(store.get("login").await.unwrap(), None);
        // Removing from a missing file does not create it
        store.remove(&["login"]).await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_malformed_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        tokio::fs::write(store.path(), "invalid json content")
            .await
            .unwrap();

        assert_eq!(store.get("login").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_keeps_other_records() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        store
            .set_many(vec![
                ("login".to_string(), json!({ "auth": "a", "expiration": 1 })),
                ("loginData".to_string(), json!({ "username": "u", "password": "p" })),
            ])
            .await
            .unwrap();

        store.remove(&["loginData"]).await.unwrap();

        assert!(store.get("loginData").await.unwrap().is_none());
        assert!(store.get("login").await.unwrap().is_some());
    }
}
