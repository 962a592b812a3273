//! Whole-document persistence for the storage and config files.
//!
//! Writes go to a sibling temp file, are fsynced and then renamed over the
//! target. Read-modify-write cycles hold an exclusive lock file for their
//! whole duration.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use roaster_core::RoasterError;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// On-disk encoding of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

#[derive(Error, Debug)]
pub enum AtomicFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Could not lock {path}: {reason}")]
    Lock { path: PathBuf, reason: String },

    #[error("Not a file path: {0}")]
    InvalidPath(PathBuf),
}

impl From<AtomicFileError> for RoasterError {
    fn from(e: AtomicFileError) -> Self {
        match e {
            AtomicFileError::Io(io) => io.into(),
            AtomicFileError::Json(json) => json.into(),
            AtomicFileError::TomlParse(de) => de.into(),
            AtomicFileError::TomlWrite(ser) => ser.into(),
            other @ (AtomicFileError::Lock { .. } | AtomicFileError::InvalidPath(_)) => {
                RoasterError::data_access(other.to_string())
            }
        }
    }
}

/// A typed JSON or TOML document on disk.
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for AtomicFile<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone(), self.format)
    }
}

impl<T> AtomicFile<T> {
    pub fn new(path: PathBuf, format: FileFormat) -> Self {
        Self {
            path,
            format,
            _phantom: PhantomData,
        }
    }

    pub fn json(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Json)
    }

    pub fn toml(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Toml)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Reads the document. A missing or blank file reads as `None`.
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        let data = match self.format {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
        };
        Ok(Some(data))
    }

    /// Replaces the document. Readers see either the old or the new version.
    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        let encoded = match self.format {
            FileFormat::Json => serde_json::to_string_pretty(data)?,
            FileFormat::Toml => toml::to_string_pretty(data)?,
        };

        let (dir, tmp_path) = self.temp_path()?;
        fs::create_dir_all(dir)?;

        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(encoded.as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Loads (or starts from `default_value`), lets `f` edit, and writes back
    /// only if `f` succeeds. The lock is held throughout.
    pub fn update<F, R>(&self, default_value: T, f: F) -> Result<R, AtomicFileError>
    where
        F: FnOnce(&mut T) -> Result<R, AtomicFileError>,
    {
        let _lock = LockGuard::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        let result = f(&mut data)?;
        self.save(&data)?;
        Ok(result)
    }

    fn temp_path(&self) -> Result<(&Path, PathBuf), AtomicFileError> {
        match (self.path.parent(), self.path.file_name()) {
            (Some(dir), Some(name)) => {
                let tmp = dir.join(format!(".{}.tmp", name.to_string_lossy()));
                Ok((dir, tmp))
            }
            _ => Err(AtomicFileError::InvalidPath(self.path.clone())),
        }
    }
}

/// Exclusive lock on `<file>.lock`, released on drop.
///
/// The lock file stays on disk; unlinking it races waiters holding the old inode.
struct LockGuard {
    file: File,
}

impl LockGuard {
    fn acquire(target: &Path) -> Result<Self, AtomicFileError> {
        let path = target.with_extension("lock");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive().map_err(|e| AtomicFileError::Lock {
            path,
            reason: e.to_string(),
        })?;

        Ok(Self { file })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
