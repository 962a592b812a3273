//! Path management for roaster configuration and state files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/roaster/           # Root (platform config dir + "roaster")
//! ├── config.toml              # RoasterConfig
//! ├── storage.json             # Key/value store backing the session
//! └── logs/                    # Daily rolling logs
//!     └── roaster.YYYY-MM-DD.log
//! ```

use std::path::{Path, PathBuf};

use roaster_core::RoasterError;
use thiserror::Error;

const APP_DIR: &str = "roaster";

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Cannot find configuration directory")]
    ConfigDirNotFound,
}

impl From<PathError> for RoasterError {
    fn from(e: PathError) -> Self {
        RoasterError::config(e.to_string())
    }
}

/// Resolves every file the roaster keeps on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoasterPaths {
    root: PathBuf,
}

impl RoasterPaths {
    /// Uses `base` as the root when given, otherwise `<config dir>/roaster`.
    pub fn new(base: Option<PathBuf>) -> Result<Self, PathError> {
        let root = match base {
            Some(base) => base,
            None => dirs::config_dir()
                .ok_or(PathError::ConfigDirNotFound)?
                .join(APP_DIR),
        };
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn storage_file(&self) -> PathBuf {
        self.root.join("storage.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_base() {
        let paths = RoasterPaths::new(Some(PathBuf::from("/tmp/roaster-test"))).unwrap();
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/roaster-test/config.toml"));
        assert_eq!(paths.storage_file(), PathBuf::from("/tmp/roaster-test/storage.json"));
        assert_eq!(paths.logs_dir(), PathBuf::from("/tmp/roaster-test/logs"));
    }

    #[test]
    fn test_default_root_ends_with_app_dir() {
        if let Ok(paths) = RoasterPaths::new(None) {
            assert!(paths.root().ends_with(APP_DIR));
        }
    }
}
