//! Configuration service implementation.
//!
//! Loads `RoasterConfig` from `config.toml`, writing the defaults on first
//! run, and applies environment overrides on top.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use roaster_core::Result;
use roaster_core::config::RoasterConfig;

use crate::storage::AtomicFile;

/// Overrides `api_url` regardless of the file contents.
pub const API_URL_ENV: &str = "ROASTER_API_URL";

/// Loads and caches the root configuration.
#[derive(Clone)]
pub struct ConfigService {
    file: AtomicFile<RoasterConfig>,
    cached: Arc<RwLock<Option<RoasterConfig>>>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::toml(path),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the configuration, loading it from disk on first access.
    pub fn get_config(&self) -> Result<RoasterConfig> {
        if let Ok(guard) = self.cached.read() {
            if let Some(cached) = guard.as_ref() {
                return Ok(cached.clone());
            }
        }

        let mut config = self.load_or_create()?;
        apply_env_overrides(&mut config, std::env::var(API_URL_ENV).ok());

        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(config.clone());
        }
        Ok(config)
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut guard) = self.cached.write() {
            *guard = None;
        }
    }

    fn load_or_create(&self) -> Result<RoasterConfig> {
        match self.file.load()? {
            Some(config) => Ok(config),
            None => {
                let config = RoasterConfig::default();
                self.file.save(&config)?;
                tracing::info!(
                    "[Config] Wrote default configuration to {}",
                    self.file.path().display()
                );
                Ok(config)
            }
        }
    }
}

fn apply_env_overrides(config: &mut RoasterConfig, api_url: Option<String>) {
    if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
        tracing::debug!("[Config] {} overrides api_url", API_URL_ENV);
        config.api_url = url;
    }
}
