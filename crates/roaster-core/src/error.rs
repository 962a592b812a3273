//! Error types shared by every roaster crate.

use thiserror::Error;

/// Workspace-wide error.
///
/// Remote generation failures display the backend's `detail` text unchanged,
/// since that text is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoasterError {
    #[error("IO error: {0}")]
    Io(String),

    /// Storage layer failure other than plain I/O (locking, bad paths).
    #[error("Storage error: {0}")]
    DataAccess(String),

    #[error("Invalid {format} data: {message}")]
    Serialization {
        format: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP failure (connection refused, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The generation service answered with a non-success status.
    #[error("{detail}")]
    Generation { status: Option<u16>, detail: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoasterError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    pub fn generation(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::Generation {
            status,
            detail: detail.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn serialization(format: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            format,
            message: err.to_string(),
        }
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// True for failures of a remote generation call, whether the request
    /// never completed or the backend rejected it.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::Generation { .. } | Self::Http(_))
    }
}

impl From<std::io::Error> for RoasterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for RoasterError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err)
    }
}

impl From<toml::de::Error> for RoasterError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

impl From<toml::ser::Error> for RoasterError {
    fn from(err: toml::ser::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

impl From<reqwest::Error> for RoasterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::serialization("JSON", err)
        } else {
            Self::Http(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, RoasterError>;
