//! In-memory key/value storage.

use std::collections::HashMap;

use async_trait::async_trait;
use roaster_core::Result;
use roaster_core::session::StorageRepository;
use serde_json::Value;
use tokio::sync::RwLock;

/// Process-local storage. Contents vanish with the instance.
#[derive(Debug, Default)]
pub struct InMemoryStorageRepository {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryStorageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the storage, e.g. with a state captured from another run.
    pub fn with_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            values: RwLock::new(entries.into_iter().collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl StorageRepository for InMemoryStorageRepository {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let values = self.values.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut values = self.values.write().await;
        values.extend(entries);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut values = self.values.write().await;
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}
