//! Panel controller: the UI state machine behind the side panel.
//!
//! # Module Structure
//!
//! - `controller`: `PanelController` and its collaborators
//! - `state`: Panel states, status line and user-facing texts
//! - `share`: Share text, limit notice and upgrade link rendering

mod controller;
mod share;
mod state;

pub use controller::{PanelController, PanelServices};
pub use share::{limit_reached_notice, roast_share_text, upgrade_url};
pub use state::{
    ActivityState, NOTICE_NO_PROFILE, NOTICE_POLISH_FAILED, NOTICE_POLISH_NO_PROFILE,
    NOTICE_POLISH_PRO_ONLY, NOTICE_ROAST_FAILED, PanelError, PanelState, PanelStatus,
    STATUS_EXTRACTION_FAILED, STATUS_FETCHING, STATUS_INVALID_URL, STATUS_NAVIGATE, STATUS_READY,
    StatusKind,
};
