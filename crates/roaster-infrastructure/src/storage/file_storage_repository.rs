//! File-backed key/value storage.
//!
//! The whole key space lives in one JSON document. Every write goes through
//! [`AtomicFile::update`], so a `set` touching several keys lands in one rename.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use async_trait::async_trait;
use roaster_core::session::StorageRepository;
use roaster_core::{Result, RoasterError};
use serde_json::Value;
use tokio::sync::Mutex;

use super::atomic_file::AtomicFile;

type Document = BTreeMap<String, Value>;

pub struct FileStorageRepository {
    file: AtomicFile<Document>,
    /// In-process writers queue here; the file lock covers other processes.
    write_lock: Mutex<()>,
}

impl FileStorageRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::json(path),
            write_lock: Mutex::new(()),
        }
    }

    async fn blocking<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(AtomicFile<Document>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(file))
            .await
            .map_err(|e| RoasterError::internal(format!("storage task failed: {}", e)))?
    }
}

#[async_trait]
impl StorageRepository for FileStorageRepository {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let wanted: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.blocking(move |file| {
            let document = file.load()?.unwrap_or_default();
            Ok(wanted
                .into_iter()
                .filter_map(|key| document.get(&key).cloned().map(|value| (key, value)))
                .collect())
        })
        .await
    }

    async fn set(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.blocking(move |file| {
            file.update(Document::new(), |document| {
                document.extend(entries);
                Ok(())
            })?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let doomed: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.blocking(move |file| {
            if file.load()?.is_none() {
                return Ok(());
            }
            file.update(Document::new(), |document| {
                for key in &doomed {
                    document.remove(key);
                }
                Ok(())
            })?;
            Ok(())
        })
        .await
    }
}
