//! In-process fakes for the host and remote collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use roaster_core::generation::{GenerationService, PolishResult, RoastResult, UserInfoService};
use roaster_core::host::{
    AccountIdentity, AuthError, CaptureFormat, CapturedImage, Delivery, HostError,
    IdentityProvider, PanelChannel, TabHost, TabId, TabInfo, TokenRequest, WindowId,
};
use roaster_core::message::Message;
use roaster_core::profile::ProfileRecord;
use roaster_core::session::{Clock, SessionStore, StorageRepository, UserInfo};
use roaster_core::{Result, RoasterError};
use roaster_infrastructure::InMemoryStorageRepository;
use serde_json::{Value, json};

pub const PROFILE_URL: &str = "https://www.linkedin.com/in/jane-doe";

pub fn profile(url: &str) -> ProfileRecord {
    let mut profile = ProfileRecord::new(url);
    profile.name = Some("Jane Doe".to_string());
    profile.headline = Some("Synergy Evangelist".to_string());
    profile
}

pub fn extractor_reply(url: &str) -> Value {
    json!({"success": true, "data": profile(url)})
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct FixedClock(Mutex<NaiveDate>);

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self(Mutex::new(today))
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}

pub fn memory_store(clock: Arc<FixedClock>) -> (Arc<InMemoryStorageRepository>, Arc<SessionStore>) {
    let storage = Arc::new(InMemoryStorageRepository::new());
    let store = Arc::new(SessionStore::new(
        storage.clone() as Arc<dyn StorageRepository>,
        clock,
    ));
    (storage, store)
}

/// Scriptable tab host that counts extractor traffic.
pub struct FakeTabs {
    pub active: Mutex<Option<TabInfo>>,
    /// Replies to `send_to_tab` in order; once drained every send finds no receiver.
    pub replies: Mutex<VecDeque<std::result::Result<Value, HostError>>>,
    pub inject_error: Mutex<Option<HostError>>,
    pub capture_error: Mutex<Option<HostError>>,
    pub sends: AtomicUsize,
    pub injections: AtomicUsize,
    pub created: Mutex<Vec<String>>,
    pub opened_panels: Mutex<Vec<WindowId>>,
}

impl FakeTabs {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
            replies: Mutex::new(VecDeque::new()),
            inject_error: Mutex::new(None),
            capture_error: Mutex::new(None),
            sends: AtomicUsize::new(0),
            injections: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
            opened_panels: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(url: &str) -> Self {
        let tabs = Self::new();
        tabs.navigate(url);
        tabs
    }

    pub fn navigate(&self, url: &str) {
        *self.active.lock().unwrap() = Some(TabInfo {
            id: 1,
            window_id: 10,
            url: Some(url.to_string()),
        });
    }

    pub fn reply(&self, reply: std::result::Result<Value, HostError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn injections(&self) -> usize {
        self.injections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TabHost for FakeTabs {
    async fn active_tab(&self) -> std::result::Result<Option<TabInfo>, HostError> {
        Ok(self.active.lock().unwrap().clone())
    }

    async fn get_tab(&self, tab_id: TabId) -> std::result::Result<Option<TabInfo>, HostError> {
        Ok(self
            .active
            .lock()
            .unwrap()
            .clone()
            .filter(|tab| tab.id == tab_id))
    }

    async fn send_to_tab(
        &self,
        _tab_id: TabId,
        message: Message,
    ) -> std::result::Result<Value, HostError> {
        assert_eq!(message, Message::ExtractProfile);
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(HostError::NoReceiver))
    }

    async fn inject_extractor(&self, _tab_id: TabId) -> std::result::Result<(), HostError> {
        self.injections.fetch_add(1, Ordering::SeqCst);
        match self.inject_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn create_tab(&self, url: &str) -> std::result::Result<TabInfo, HostError> {
        let mut created = self.created.lock().unwrap();
        created.push(url.to_string());
        Ok(TabInfo {
            id: 100 + created.len() as TabId,
            window_id: 10,
            url: Some(url.to_string()),
        })
    }

    async fn capture_visible_tab(
        &self,
        format: CaptureFormat,
    ) -> std::result::Result<CapturedImage, HostError> {
        if let Some(err) = self.capture_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(CapturedImage {
            format,
            bytes: vec![0xff, 0xd8, 0xff],
        })
    }

    async fn open_side_panel(&self, window_id: WindowId) -> std::result::Result<(), HostError> {
        self.opened_panels.lock().unwrap().push(window_id);
        Ok(())
    }
}

/// Records broadcasts; delivers only while `listening`.
pub struct FakePanel {
    pub listening: bool,
    pub received: Mutex<Vec<Message>>,
}

impl FakePanel {
    pub fn listening() -> Self {
        Self {
            listening: true,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn closed() -> Self {
        Self {
            listening: false,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<Message> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl PanelChannel for FakePanel {
    async fn broadcast(&self, message: Message) -> Delivery {
        if !self.listening {
            return Delivery::Dropped;
        }
        self.received.lock().unwrap().push(message);
        Delivery::Delivered
    }
}

pub struct FakeIdentity {
    pub silent: Mutex<std::result::Result<String, AuthError>>,
    pub interactive: Mutex<std::result::Result<String, AuthError>>,
    pub account: Option<AccountIdentity>,
    pub requests: Mutex<Vec<TokenRequest>>,
    pub removed: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn new(
        silent: std::result::Result<String, AuthError>,
        interactive: std::result::Result<String, AuthError>,
    ) -> Self {
        Self {
            silent: Mutex::new(silent),
            interactive: Mutex::new(interactive),
            account: None,
            requests: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }

    pub fn signed_out() -> Self {
        Self::new(
            Err(AuthError::InteractionRequired),
            Err(AuthError::Cancelled),
        )
    }

    pub fn requests(&self) -> Vec<TokenRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn get_auth_token(
        &self,
        request: TokenRequest,
    ) -> std::result::Result<String, AuthError> {
        let interactive = request.interactive;
        self.requests.lock().unwrap().push(request);
        if interactive {
            self.interactive.lock().unwrap().clone()
        } else {
            self.silent.lock().unwrap().clone()
        }
    }

    async fn profile_user_info(&self) -> Option<AccountIdentity> {
        self.account.clone()
    }

    async fn remove_cached_auth_token(&self, token: &str) {
        self.removed.lock().unwrap().push(token.to_string());
    }
}

pub struct FakeUserInfo {
    pub info: Option<UserInfo>,
}

impl FakeUserInfo {
    pub fn jane() -> Self {
        Self {
            info: Some(UserInfo {
                id: "g-1".to_string(),
                email: "jane@example.com".to_string(),
                name: "Jane".to_string(),
                picture: String::new(),
            }),
        }
    }

    pub fn failing() -> Self {
        Self { info: None }
    }
}

#[async_trait]
impl UserInfoService for FakeUserInfo {
    async fn fetch_user_info(&self, _access_token: &str) -> Result<UserInfo> {
        self.info
            .clone()
            .ok_or_else(|| RoasterError::auth("user info request returned 401"))
    }
}

/// Generation fake with scripted outcomes and call counters.
pub struct FakeGeneration {
    pub pro: Mutex<Result<bool>>,
    pub fail_roast: Mutex<Option<String>>,
    pub fail_polish: Mutex<Option<String>>,
    pub roasts: AtomicUsize,
    pub polishes: AtomicUsize,
    pub screenshots: Mutex<Vec<Option<String>>>,
    pub polish_had_roast: Mutex<Vec<bool>>,
}

impl FakeGeneration {
    pub fn new(is_pro: bool) -> Self {
        Self {
            pro: Mutex::new(Ok(is_pro)),
            fail_roast: Mutex::new(None),
            fail_polish: Mutex::new(None),
            roasts: AtomicUsize::new(0),
            polishes: AtomicUsize::new(0),
            screenshots: Mutex::new(Vec::new()),
            polish_had_roast: Mutex::new(Vec::new()),
        }
    }

    pub fn roasts(&self) -> usize {
        self.roasts.load(Ordering::SeqCst)
    }

    pub fn polishes(&self) -> usize {
        self.polishes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for FakeGeneration {
    async fn roast(&self, _profile: &ProfileRecord, screenshot: Option<&str>) -> Result<RoastResult> {
        self.roasts.fetch_add(1, Ordering::SeqCst);
        self.screenshots
            .lock()
            .unwrap()
            .push(screenshot.map(str::to_string));
        if let Some(detail) = self.fail_roast.lock().unwrap().clone() {
            return Err(RoasterError::generation(Some(500), detail));
        }
        Ok(RoastResult {
            summary: "Peak LinkedIn.".to_string(),
            strengths: vec!["Consistent".to_string()],
            weaknesses: vec!["Synergy".to_string()],
            advice: vec!["Say less".to_string()],
            rating: Some(5.0),
        })
    }

    async fn polish(
        &self,
        _profile: &ProfileRecord,
        roast: Option<&RoastResult>,
    ) -> Result<PolishResult> {
        self.polishes.fetch_add(1, Ordering::SeqCst);
        self.polish_had_roast.lock().unwrap().push(roast.is_some());
        if let Some(detail) = self.fail_polish.lock().unwrap().clone() {
            return Err(RoasterError::generation(Some(500), detail));
        }
        Ok(PolishResult {
            branding_tip: "Lead with outcomes".to_string(),
            headline: "Builder".to_string(),
            summary: "Builds things.".to_string(),
            experience: Vec::new(),
        })
    }

    async fn pro_status(&self, _email: &str) -> Result<bool> {
        self.pro.lock().unwrap().clone()
    }
}
