//! Panel UI state and the user-facing texts attached to it.

pub const STATUS_NAVIGATE: &str = "Navigate to a LinkedIn profile";
pub const STATUS_FETCHING: &str = "Fetching profile data...";
pub const STATUS_READY: &str = "Ready to roast!";
pub const STATUS_INVALID_URL: &str = "Invalid LinkedIn profile URL";
pub const STATUS_EXTRACTION_FAILED: &str = "Profile data extraction failed";

pub const NOTICE_NO_PROFILE: &str =
    "No profile data detected yet. Please wait a moment or try refreshing.";
pub const NOTICE_ROAST_FAILED: &str = "Failed to generate roast. Please try again.";
pub const NOTICE_POLISH_PRO_ONLY: &str = "✨ Upgrade to Pro to use the Profile Surgeon.";
pub const NOTICE_POLISH_NO_PROFILE: &str = "Please navigate to a LinkedIn profile first!";
pub const NOTICE_POLISH_FAILED: &str = "Surgeon was interrupted. Please try again.";

/// Top-level panel state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Unauthenticated,
    Authenticated(ActivityState),
}

impl PanelState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn activity(&self) -> Option<&ActivityState> {
        match self {
            Self::Authenticated(activity) => Some(activity),
            Self::Unauthenticated => None,
        }
    }
}

/// What a signed-in panel is doing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActivityState {
    #[default]
    Idle,
    Fetching,
    Ready,
    Roasting,
    RoastDisplayed,
    Polishing,
    PolishDisplayed,
    Error(PanelError),
}

impl ActivityState {
    /// States from which a roast or polish may start, given a profile.
    pub fn accepts_requests(&self) -> bool {
        match self {
            Self::Ready | Self::RoastDisplayed | Self::PolishDisplayed => true,
            Self::Error(err) => err.recoverable,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelError {
    pub message: String,
    /// The user can retry from here without navigating away.
    pub recoverable: bool,
}

impl PanelError {
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recoverable: true,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recoverable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Idle,
    Ready,
    Error,
}

/// The status line under the panel header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelStatus {
    pub kind: StatusKind,
    pub text: String,
}

impl PanelStatus {
    pub fn idle() -> Self {
        Self::new(StatusKind::Idle, STATUS_NAVIGATE)
    }

    pub fn ready(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Ready, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, text)
    }

    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl Default for PanelStatus {
    fn default() -> Self {
        Self::idle()
    }
}
