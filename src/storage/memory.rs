//! In-memory key-value store

use super::KeyValueStore;
use crate::Result;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records<I, K>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            records: RwLock::new(records.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Names of the records currently held
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.records.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut records = self.records.write().await;
        records.extend(entries);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut records = self.records.write().await;
        for key in keys {
            records.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        store
            .set_many(vec![
                ("login".to_string(), json!({ "auth": "a" })),
                ("user".to_string(), json!({ "userId": "1" })),
            ])
            .await
            .unwrap();

        assert_eq!(store.get("login").await.unwrap(), Some(json!({ "auth": "a" })));
        assert_eq!(store.keys().await, vec!["login", "user"]);

        store.remove(&["login", "missing"]).await.unwrap();
        assert_eq!(store.get("login").await.unwrap(), None);
        assert_eq!(store.keys().await, vec!["user"]);
    }
}
