//! Background message router.
//!
//! The router is the single dispatch point between the page extractor, the
//! panel and the host. Failures that depend on another context being present
//! are recoverable: extraction retries once, profile forwarding falls back to
//! the stash slot and page-state broadcasts are dropped silently.

mod extraction;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use roaster_core::host::{
    CaptureFormat, Delivery, HostError, PanelChannel, TabHost, TabId, TabInfo, TabStatus,
};
use roaster_core::message::{ExtractionFailure, Message, RouterResponse};
use roaster_core::profile::{ProfileRecord, TabPageState};
use roaster_core::session::SessionStore;

/// Quality used for roast screenshots.
pub const SCREENSHOT_FORMAT: CaptureFormat = CaptureFormat::Jpeg { quality: 80 };

/// How a context talks to the router.
#[async_trait]
pub trait RouterClient: Send + Sync {
    /// Sends `message` and waits for the router's reply.
    async fn send(&self, message: Message) -> RouterResponse;
}

pub struct MessageRouter {
    tabs: Arc<dyn TabHost>,
    panel: Arc<dyn PanelChannel>,
    store: Arc<SessionStore>,
    injection_grace: Duration,
}

impl MessageRouter {
    pub fn new(
        tabs: Arc<dyn TabHost>,
        panel: Arc<dyn PanelChannel>,
        store: Arc<SessionStore>,
        injection_grace: Duration,
    ) -> Self {
        Self {
            tabs,
            panel,
            store,
            injection_grace,
        }
    }

    /// Dispatches one incoming message. Never fails: errors become `{error}` replies.
    pub async fn handle(&self, message: Message) -> RouterResponse {
        tracing::debug!("[Router] Handling {}", message.kind());
        match message {
            Message::ProfileData { data, url } => {
                self.forward_profile_data(data, url).await;
                RouterResponse::ack()
            }
            Message::GetProfileData => match self.request_profile_data().await {
                Ok(data) => RouterResponse::ProfileData { data },
                Err(failure) => RouterResponse::failure(failure),
            },
            Message::OpenAuth { url } => match self.open_external_auth(&url).await {
                Ok(tab_id) => RouterResponse::AuthTabOpened {
                    success: true,
                    tab_id,
                },
                Err(err) => RouterResponse::failure(err),
            },
            Message::CaptureScreenshot => match self.capture_visible_snapshot().await {
                Ok(data_url) => RouterResponse::Screenshot { data_url },
                Err(err) => RouterResponse::failure(err),
            },
            other => {
                tracing::debug!("[Router] Ignoring {} addressed elsewhere", other.kind());
                RouterResponse::NoResponse
            }
        }
    }

    /// Hands page data to the panel, or parks it when no panel is listening.
    pub async fn forward_profile_data(&self, data: ProfileRecord, url: String) {
        let delivery = self
            .panel
            .broadcast(Message::ProfileDataReceived {
                data: data.clone(),
                url: url.clone(),
            })
            .await;

        if delivery == Delivery::Dropped {
            tracing::info!("[Router] Panel not listening, stashing profile data for {}", url);
            if let Err(err) = self.store.stash_last_profile(&data, &url).await {
                tracing::error!("[Router] Failed to stash profile data: {}", err);
            }
        }
    }

    /// Extracts the profile shown in the active tab.
    pub async fn request_profile_data(&self) -> Result<ProfileRecord, ExtractionFailure> {
        let tab = match self.tabs.active_tab().await {
            Ok(Some(tab)) => tab,
            Ok(None) => return Err(ExtractionFailure::NotProfilePage),
            Err(err) => {
                tracing::warn!("[Router] Could not query the active tab: {}", err);
                return Err(ExtractionFailure::NotProfilePage);
            }
        };

        if !TabPageState::classify(tab.url.as_deref()).is_profile_page() {
            return Err(ExtractionFailure::NotProfilePage);
        }

        extraction::extract_from_tab(self.tabs.as_ref(), tab.id, self.injection_grace).await
    }

    /// Opens `url` in a new tab for an out-of-band auth flow.
    pub async fn open_external_auth(&self, url: &str) -> Result<TabId, HostError> {
        let tab = self.tabs.create_tab(url).await?;
        tracing::info!("[Router] Opened auth tab {}", tab.id);
        Ok(tab.id)
    }

    /// Captures the visible tab as a `data:` URL.
    pub async fn capture_visible_snapshot(&self) -> Result<String, HostError> {
        let image = self.tabs.capture_visible_tab(SCREENSHOT_FORMAT).await?;
        Ok(format!(
            "data:{};base64,{}",
            image.format.mime_type(),
            STANDARD.encode(&image.bytes)
        ))
    }

    /// Navigation observer. Only completed loads are classified.
    pub async fn on_tab_updated(&self, tab: &TabInfo, status: TabStatus) {
        if status == TabStatus::Complete {
            self.announce_page_state(tab.url.as_deref()).await;
        }
    }

    /// Activation observer.
    pub async fn on_tab_activated(&self, tab_id: TabId) {
        match self.tabs.get_tab(tab_id).await {
            Ok(tab) => {
                let url = tab.and_then(|tab| tab.url);
                self.announce_page_state(url.as_deref()).await;
            }
            Err(err) => {
                tracing::debug!("[Router] Activated tab {} is gone: {}", tab_id, err);
                self.announce_page_state(None).await;
            }
        }
    }

    /// Toolbar action: open the panel in the clicked tab's window.
    pub async fn on_action_clicked(&self, tab: &TabInfo) -> Result<(), HostError> {
        self.tabs.open_side_panel(tab.window_id).await
    }

    async fn announce_page_state(&self, url: Option<&str>) {
        let message = match TabPageState::classify(url) {
            TabPageState::ValidProfilePage { url } => Message::ValidProfilePage { url },
            TabPageState::NotProfilePage => Message::NotProfilePage,
        };
        // At-most-once; nobody listening is fine.
        let _ = self.panel.broadcast(message).await;
    }
}

#[async_trait]
impl RouterClient for MessageRouter {
    async fn send(&self, message: Message) -> RouterResponse {
        self.handle(message).await
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
