use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://roast.wansatya.com";
pub const DEFAULT_USER_INFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
pub const DEFAULT_UPGRADE_CONTACT_URL: &str = "https://wa.me/6285158851103";

/// Root configuration, persisted as `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RoasterConfig {
    /// Base URL of the generation service.
    pub api_url: String,
    /// Identity provider user-info endpoint.
    pub user_info_url: String,
    /// Free roasts per calendar day.
    pub daily_roast_limit: u32,
    /// How long the router waits after injecting the extractor before retrying.
    pub injection_grace_ms: u64,
    /// How long the panel waits before asking for profile data.
    pub page_fetch_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub upgrade_contact_url: String,
    pub pro_price_label: String,
}

impl Default for RoasterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_info_url: DEFAULT_USER_INFO_URL.to_string(),
            daily_roast_limit: 8,
            injection_grace_ms: 100,
            page_fetch_delay_ms: 500,
            request_timeout_secs: 60,
            upgrade_contact_url: DEFAULT_UPGRADE_CONTACT_URL.to_string(),
            pro_price_label: "IDR 20k/mo".to_string(),
        }
    }
}

impl RoasterConfig {
    pub fn injection_grace(&self) -> Duration {
        Duration::from_millis(self.injection_grace_ms)
    }

    pub fn page_fetch_delay(&self) -> Duration {
        Duration::from_millis(self.page_fetch_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `api_url` without a trailing slash, ready for path joins.
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}
