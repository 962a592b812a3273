//! Profile-page URL classification.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Secure profile URL prefix followed by one non-empty handle segment.
///
/// Anything may follow the handle once a `/`, `?` or `#` terminates it.
pub const PROFILE_URL_PATTERN: &str = r"^https://www\.linkedin\.com/in/([^/?#]+)([/?#].*)?$";

static PROFILE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(PROFILE_URL_PATTERN).expect("profile URL pattern is a valid regex")
});

/// Returns true when `url` points at a professional-network profile page.
pub fn is_profile_page(url: &str) -> bool {
    PROFILE_URL.is_match(url)
}

/// The profile handle of `url`, e.g. `jane-doe` for `.../in/jane-doe/details/`.
pub fn profile_handle(url: &str) -> Option<&str> {
    PROFILE_URL
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|handle| handle.as_str())
}

/// Classification of the active tab, recomputed on every navigation or activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TabPageState {
    ValidProfilePage { url: String },
    NotProfilePage,
}

impl TabPageState {
    /// Classifies an optional tab URL. Tabs without a URL are never profile pages.
    pub fn classify(url: Option<&str>) -> Self {
        match url {
            Some(url) if is_profile_page(url) => Self::ValidProfilePage {
                url: url.to_string(),
            },
            _ => Self::NotProfilePage,
        }
    }

    pub fn is_profile_page(&self) -> bool {
        matches!(self, Self::ValidProfilePage { .. })
    }
}
