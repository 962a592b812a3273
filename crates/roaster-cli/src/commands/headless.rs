//! Host adapters for running the panel without a browser.
//!
//! The "active tab" is a profile record loaded from disk, and the identity
//! provider hands out a token given on the command line or the stored one.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use roaster_core::host::{
    AccountIdentity, AuthError, CaptureFormat, CapturedImage, HostError, IdentityProvider,
    TabHost, TabId, TabInfo, TokenRequest, WindowId,
};
use roaster_core::message::Message;
use roaster_core::profile::ProfileRecord;
use serde_json::{Value, json};

const TAB_ID: TabId = 1;
const WINDOW_ID: WindowId = 1;

/// A single tab showing a profile read from a file.
pub struct ProfileFileTab {
    profile: Option<ProfileRecord>,
}

impl ProfileFileTab {
    /// No tab open at all.
    pub fn empty() -> Self {
        Self { profile: None }
    }

    pub fn showing(profile: ProfileRecord) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    /// Reads a profile record from `path`. A missing `timestamp` is stamped now.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;

        if let Some(fields) = value.as_object_mut() {
            fields
                .entry("timestamp")
                .or_insert_with(|| json!(Utc::now()));
        }

        let profile: ProfileRecord = serde_json::from_value(value)
            .with_context(|| format!("{} is not a profile record", path.display()))?;
        Ok(Self::showing(profile))
    }

    fn tab(&self) -> Option<TabInfo> {
        self.profile.as_ref().map(|profile| TabInfo {
            id: TAB_ID,
            window_id: WINDOW_ID,
            url: Some(profile.url.clone()),
        })
    }
}

#[async_trait]
impl TabHost for ProfileFileTab {
    async fn active_tab(&self) -> Result<Option<TabInfo>, HostError> {
        Ok(self.tab())
    }

    async fn get_tab(&self, tab_id: TabId) -> Result<Option<TabInfo>, HostError> {
        Ok(self.tab().filter(|tab| tab.id == tab_id))
    }

    async fn send_to_tab(&self, _tab_id: TabId, message: Message) -> Result<Value, HostError> {
        match (&self.profile, message) {
            (Some(profile), Message::ExtractProfile) => {
                Ok(json!({"success": true, "data": profile}))
            }
            (None, _) => Err(HostError::NoReceiver),
            (Some(_), other) => Err(HostError::LastError(format!(
                "{} is not understood by a profile file",
                other.kind()
            ))),
        }
    }

    async fn inject_extractor(&self, _tab_id: TabId) -> Result<(), HostError> {
        Ok(())
    }

    async fn create_tab(&self, _url: &str) -> Result<TabInfo, HostError> {
        Err(HostError::Unavailable("no browser attached".to_string()))
    }

    async fn capture_visible_tab(&self, _format: CaptureFormat) -> Result<CapturedImage, HostError> {
        Err(HostError::Unavailable("no visible tab to capture".to_string()))
    }

    async fn open_side_panel(&self, _window_id: WindowId) -> Result<(), HostError> {
        Err(HostError::Unavailable("no browser attached".to_string()))
    }
}

/// Identity provider backed by a bearer token obtained elsewhere.
pub struct TokenIdentity {
    token: Option<String>,
}

impl TokenIdentity {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }
}

#[async_trait]
impl IdentityProvider for TokenIdentity {
    async fn get_auth_token(&self, request: TokenRequest) -> Result<String, AuthError> {
        match &self.token {
            Some(token) => Ok(token.clone()),
            None if request.interactive => Err(AuthError::Provider(
                "No access token given; pass --token or set ROASTER_ACCESS_TOKEN".to_string(),
            )),
            None => Err(AuthError::InteractionRequired),
        }
    }

    async fn profile_user_info(&self) -> Option<AccountIdentity> {
        None
    }

    async fn remove_cached_auth_token(&self, _token: &str) {
        tracing::debug!("[Cli] No token cache to clear");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_stamps_missing_timestamp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(
            &path,
            r#"{"url": "https://www.linkedin.com/in/jane-doe", "name": "Jane Doe"}"#,
        )
        .unwrap();

        let tab = ProfileFileTab::load(&path).unwrap();
        let profile = tab.profile.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
        assert_eq!(profile.connections, "Unknown");
    }

    #[test]
    fn test_load_rejects_non_profile_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{"name": "no url"}"#).unwrap();

        assert!(ProfileFileTab::load(&path).is_err());
    }

    #[tokio::test]
    async fn test_profile_tab_answers_extraction() {
        let tab = ProfileFileTab::showing(ProfileRecord::new("https://www.linkedin.com/in/jane"));

        let active = tab.active_tab().await.unwrap().unwrap();
        let reply = tab.send_to_tab(active.id, Message::ExtractProfile).await.unwrap();

        assert_eq!(reply["success"], json!(true));
        assert_eq!(reply["data"]["url"], json!("https://www.linkedin.com/in/jane"));
        assert!(tab.capture_visible_tab(CaptureFormat::Png).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_tab_has_no_receiver() {
        let tab = ProfileFileTab::empty();
        assert_eq!(tab.active_tab().await.unwrap(), None);
        assert_eq!(
            tab.send_to_tab(TAB_ID, Message::ExtractProfile).await,
            Err(HostError::NoReceiver)
        );
    }

    #[tokio::test]
    async fn test_token_identity_without_token() {
        let identity = TokenIdentity::new(Some("  ".to_string()));

        assert_eq!(
            identity.get_auth_token(TokenRequest::silent()).await,
            Err(AuthError::InteractionRequired)
        );
        let err = identity
            .get_auth_token(TokenRequest::interactive(None))
            .await
            .unwrap_err();
        assert!(err.should_surface());
    }
}
