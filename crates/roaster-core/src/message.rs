//! Cross-context message types.
//!
//! These are the JSON shapes exchanged between the page extractor, the
//! background router and the panel. Router failures travel as
//! `{ "error": "..." }` objects, never as errors thrown across the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::TabId;
use crate::profile::ProfileRecord;

/// Every message understood by the router or the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Page -> Router: data extracted on page load.
    ProfileData { data: ProfileRecord, url: String },
    /// Router -> Panel: forwarded page data.
    ProfileDataReceived { data: ProfileRecord, url: String },
    /// Panel -> Router: extract the active tab now.
    GetProfileData,
    /// Router -> Page: run the extractor.
    ExtractProfile,
    /// Panel -> Router: open an out-of-band auth page.
    OpenAuth { url: String },
    /// Panel -> Router: capture the visible tab.
    CaptureScreenshot,
    /// Router -> Panel: the active tab is a profile page.
    ValidProfilePage { url: String },
    /// Router -> Panel: the active tab is anything else.
    NotProfilePage,
}

impl Message {
    /// Wire name of the message type, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProfileData { .. } => "PROFILE_DATA",
            Self::ProfileDataReceived { .. } => "PROFILE_DATA_RECEIVED",
            Self::GetProfileData => "GET_PROFILE_DATA",
            Self::ExtractProfile => "EXTRACT_PROFILE",
            Self::OpenAuth { .. } => "OPEN_AUTH",
            Self::CaptureScreenshot => "CAPTURE_SCREENSHOT",
            Self::ValidProfilePage { .. } => "VALID_PROFILE_PAGE",
            Self::NotProfilePage => "NOT_PROFILE_PAGE",
        }
    }
}

/// Router replies, serialized untagged to match the response column of the
/// message table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouterResponse {
    AuthTabOpened {
        success: bool,
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    Ack {
        success: bool,
    },
    ProfileData {
        data: ProfileRecord,
    },
    Screenshot {
        #[serde(rename = "dataUrl")]
        data_url: String,
    },
    Failure {
        error: String,
    },
    /// Messages that expect no reply.
    NoResponse,
}

impl RouterResponse {
    pub fn ack() -> Self {
        Self::Ack { success: true }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self::Failure {
            error: error.to_string(),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failure { error } => Some(error),
            _ => None,
        }
    }
}

/// The extractor's reply to `EXTRACT_PROFILE`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<ProfileRecord>,
}

/// Why the router could not produce profile data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("Not a LinkedIn profile page")]
    NotProfilePage,

    /// The extractor could not be injected into the tab.
    #[error("Could not connect to LinkedIn page. Please refresh.")]
    CouldNotConnect,

    /// Injection went through but the retried request found no receiver either.
    #[error("Failed to extract profile data even after injection. Please refresh.")]
    UnreachableAfterInjection,

    /// The extractor answered without data.
    #[error("Profile data extraction failed")]
    NoData,
}
