//! Host environment seams.
//!
//! The browser host (tabs, script injection, capture, identity) sits behind
//! these traits so the router and panel can run against any host, including
//! in-process fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::message::Message;

pub type TabId = i64;
pub type WindowId = i64;

/// What the host knows about a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub url: Option<String>,
}

/// Tab lifecycle status reported with update events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Loading,
    Complete,
}

/// Errors raised by host calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Nobody is listening on the other end (extractor absent, panel closed).
    #[error("Could not establish connection. Receiving end does not exist.")]
    NoReceiver,

    /// The host's last-error state after a failed call.
    #[error("{0}")]
    LastError(String),

    #[error("Host unavailable: {0}")]
    Unavailable(String),
}

impl HostError {
    pub fn is_no_receiver(&self) -> bool {
        matches!(self, Self::NoReceiver)
    }
}

/// Image encoding requested from the capture API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    Jpeg { quality: u8 },
    Png,
}

impl CaptureFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Raw bytes of a captured image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub format: CaptureFormat,
    pub bytes: Vec<u8>,
}

/// Tabs, injection and capture.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// The focused tab of the current window, if any.
    async fn active_tab(&self) -> Result<Option<TabInfo>, HostError>;

    async fn get_tab(&self, tab_id: TabId) -> Result<Option<TabInfo>, HostError>;

    /// Sends `message` to the content context of `tab_id` and returns its JSON reply.
    async fn send_to_tab(&self, tab_id: TabId, message: Message) -> Result<Value, HostError>;

    /// Injects the profile extractor into `tab_id`.
    async fn inject_extractor(&self, tab_id: TabId) -> Result<(), HostError>;

    async fn create_tab(&self, url: &str) -> Result<TabInfo, HostError>;

    /// Captures the visible area of the active tab.
    async fn capture_visible_tab(&self, format: CaptureFormat) -> Result<CapturedImage, HostError>;

    async fn open_side_panel(&self, window_id: WindowId) -> Result<(), HostError>;
}

/// Result of a best-effort broadcast.
///
/// `Dropped` means no listener was attached. It is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "callers either act on Dropped or discard it explicitly"]
pub enum Delivery {
    Delivered,
    Dropped,
}

/// Router -> panel notifications. At-most-once, no acknowledgement.
#[async_trait]
pub trait PanelChannel: Send + Sync {
    async fn broadcast(&self, message: Message) -> Delivery;
}

/// Account the host browser already knows about.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// OAuth token request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenRequest {
    pub interactive: bool,
    /// Pre-selects an account to skip the account picker.
    pub account: Option<AccountIdentity>,
}

impl TokenRequest {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn interactive(account: Option<AccountIdentity>) -> Self {
        Self {
            interactive: true,
            account,
        }
    }
}

/// Sign-in failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Silent flow needs a UI, or the user closed the consent window.
    #[error("User interaction required")]
    InteractionRequired,

    #[error("The user did not approve access")]
    Cancelled,

    #[error("{0}")]
    Provider(String),

    #[error("Failed to fetch user info: {0}")]
    UserInfo(String),
}

impl AuthError {
    /// Only provider-side failures are worth showing to the user.
    pub fn should_surface(&self) -> bool {
        !matches!(self, Self::InteractionRequired | Self::Cancelled)
    }
}

/// OAuth identity provider of the host.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_auth_token(&self, request: TokenRequest) -> Result<String, AuthError>;

    /// The host's signed-in account, if it exposes one.
    async fn profile_user_info(&self) -> Option<AccountIdentity>;

    /// Drops `token` from the host cache without revoking consent.
    async fn remove_cached_auth_token(&self, token: &str);
}
