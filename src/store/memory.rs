//! In-memory cache store

use crate::error::LarderResult;
use crate::store::{CacheStore, StoredResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Cache store backed by a mutexed map.
///
/// Used by unit tests and ephemeral (`store.backend = "memory"`) runs;
/// contents do not survive the process.
pub struct MemoryStore {
    name: String,
    entries: Mutex<HashMap<String, StoredResponse>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> LarderResult<Option<StoredResponse>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, response: StoredResponse) -> LarderResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), response);
        Ok(())
    }

    async fn delete(&self, key: &str) -> LarderResult<bool> {
        let mut entries = self.entries.lock().await;
        Ok(entries.remove(key).is_some())
    }

    async fn keys(&self) -> LarderResult<Vec<String>> {
        let entries = self.entries.lock().await;
        Ok(entries.keys().cloned().collect())
    }

    async fn clear(&self) -> LarderResult<()> {
        let mut entries = self.entries.lock().await;
        entries.clear();
        Ok(())
    }

    async fn len(&self) -> LarderResult<usize> {
        let entries = self.entries.lock().await;
        Ok(entries.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
