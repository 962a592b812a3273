use std::sync::Arc;

use reqwest::Url;
use roaster_core::config::RoasterConfig;
use roaster_core::generation::{GenerationService, PolishResult, RoastResult, UserInfoService};
use roaster_core::host::{AuthError, IdentityProvider, TabHost, TokenRequest};
use roaster_core::message::{Message, RouterResponse};
use roaster_core::profile::{ProfileRecord, TabPageState, is_profile_page, profile_handle};
use roaster_core::session::{RoastAllowance, SessionStore, User, UserPatch};
use roaster_core::{Result, RoasterError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::share;
use super::state::{
    ActivityState, NOTICE_NO_PROFILE, NOTICE_POLISH_FAILED, NOTICE_POLISH_NO_PROFILE,
    NOTICE_POLISH_PRO_ONLY, NOTICE_ROAST_FAILED, PanelError, PanelState, PanelStatus,
    STATUS_EXTRACTION_FAILED, STATUS_FETCHING, STATUS_INVALID_URL, STATUS_READY,
};
use crate::router::RouterClient;

/// Collaborators the panel talks to.
#[derive(Clone)]
pub struct PanelServices {
    pub store: Arc<SessionStore>,
    pub router: Arc<dyn RouterClient>,
    pub tabs: Arc<dyn TabHost>,
    pub identity: Arc<dyn IdentityProvider>,
    pub user_info: Arc<dyn UserInfoService>,
    pub generation: Arc<dyn GenerationService>,
}

/// The panel's state machine and everything it keeps in memory.
///
/// One instance lives as long as the panel. Methods take `&mut self`, so
/// handlers run one at a time.
pub struct PanelController {
    services: PanelServices,
    config: RoasterConfig,
    state: PanelState,
    status: PanelStatus,
    user: Option<User>,
    profile: Option<ProfileRecord>,
    current_tab_url: Option<String>,
    last_roast: Option<RoastResult>,
    last_polish: Option<PolishResult>,
    notice: Option<String>,
}

impl PanelController {
    pub fn new(services: PanelServices, config: RoasterConfig) -> Self {
        Self {
            services,
            config,
            state: PanelState::Unauthenticated,
            status: PanelStatus::idle(),
            user: None,
            profile: None,
            current_tab_url: None,
            last_roast: None,
            last_polish: None,
            notice: None,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&ProfileRecord> {
        self.profile.as_ref()
    }

    pub fn last_roast(&self) -> Option<&RoastResult> {
        self.last_roast.as_ref()
    }

    pub fn last_polish(&self) -> Option<&PolishResult> {
        self.last_polish.as_ref()
    }

    /// The latest user-facing notice, cleared on read.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    fn is_pro(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.is_pro)
    }

    fn set_activity(&mut self, activity: ActivityState) {
        if self.state.is_authenticated() {
            self.state = PanelState::Authenticated(activity);
        }
    }

    fn notify(&mut self, notice: impl Into<String>) {
        let notice = notice.into();
        tracing::info!("[Panel] Notice: {}", notice);
        self.notice = Some(notice);
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Restores a persisted session, refreshes it silently, claims any
    /// stashed profile and checks the active tab.
    pub async fn start(&mut self) -> Result<()> {
        let snapshot = self.services.store.load().await?;

        match snapshot.session {
            Some(session) => {
                tracing::info!("[Panel] Restoring session for: {}", session.user.email);
                self.user = Some(session.user);
                self.state = PanelState::Authenticated(ActivityState::Idle);
                self.silent_refresh().await?;
            }
            None => {
                tracing::info!("[Panel] No stored session, showing auth screen");
                return Ok(());
            }
        }

        if let Some(stashed) = self.services.store.take_last_profile().await? {
            tracing::debug!("[Panel] Claimed stashed profile for {}", stashed.url);
            self.accept_profile(stashed.data, stashed.url);
        }

        self.check_current_page().await
    }

    async fn silent_refresh(&mut self) -> Result<()> {
        let token = match self
            .services
            .identity
            .get_auth_token(TokenRequest::silent())
            .await
        {
            Ok(token) => token,
            Err(err) => {
                tracing::debug!(
                    "[Panel] Silent token refresh failed ({}), keeping current session",
                    err
                );
                return Ok(());
            }
        };

        match self.services.user_info.fetch_user_info(&token).await {
            Ok(info) => {
                let email = info.email.clone();
                let user = self
                    .services
                    .store
                    .update_session(&token, &UserPatch::from(info))
                    .await?;
                self.user = Some(user);
                self.sync_pro_status(&email).await
            }
            Err(err) => {
                tracing::debug!(
                    "[Panel] User info refresh failed ({}), keeping current session",
                    err
                );
                Ok(())
            }
        }
    }

    /// Silent sign-in first, then interactive with the host's known account.
    ///
    /// A cancelled or interaction-required flow leaves the panel signed out
    /// without a notice.
    pub async fn sign_in(&mut self) -> Result<()> {
        let identity = Arc::clone(&self.services.identity);

        let token = match identity.get_auth_token(TokenRequest::silent()).await {
            Ok(token) => {
                tracing::info!("[Panel] Silent sign-in successful");
                token
            }
            Err(_) => {
                let account = identity.profile_user_info().await.filter(|a| !a.id.is_empty());
                if let Some(account) = &account {
                    tracing::info!(
                        "[Panel] Using host account to skip the account picker: {}",
                        account.email
                    );
                }
                match identity.get_auth_token(TokenRequest::interactive(account)).await {
                    Ok(token) => token,
                    Err(err) => return self.auth_failed(err),
                }
            }
        };

        let info = match self.services.user_info.fetch_user_info(&token).await {
            Ok(info) => info,
            Err(err) => return self.auth_failed(AuthError::UserInfo(err.to_string())),
        };

        tracing::info!("[Panel] User info received: {}", info.email);
        let email = info.email.clone();
        let user = self
            .services
            .store
            .update_session(&token, &UserPatch::from(info))
            .await?;
        self.user = Some(user);
        self.state = PanelState::Authenticated(ActivityState::Idle);

        self.sync_pro_status(&email).await?;
        self.check_current_page().await
    }

    fn auth_failed(&mut self, err: AuthError) -> Result<()> {
        if err.should_surface() {
            tracing::error!("[Panel] Auth error: {}", err);
            self.notify(format!("Authentication failed: {}", err));
            Err(RoasterError::auth(err.to_string()))
        } else {
            tracing::debug!("[Panel] Sign-in not completed: {}", err);
            Ok(())
        }
    }

    /// Asks the subscription authority for `email` and records a change.
    ///
    /// An unreachable authority leaves the current status untouched.
    pub async fn sync_pro_status(&mut self, email: &str) -> Result<()> {
        if email.is_empty() {
            return Ok(());
        }

        let is_pro = match self.services.generation.pro_status(email).await {
            Ok(is_pro) => is_pro,
            Err(err) => {
                tracing::warn!("[Panel] Failed to sync Pro status: {}", err);
                return Ok(());
            }
        };

        if self.user.as_ref().map(|user| user.is_pro) != Some(is_pro) {
            let user = self
                .services
                .store
                .merge_user(&UserPatch::pro_status(is_pro))
                .await?;
            self.user = Some(user);
        }
        Ok(())
    }

    /// Drops the cached identity token and the session. Usage survives.
    pub async fn sign_out(&mut self) -> Result<()> {
        if let Some(token) = self.services.store.access_token().await? {
            self.services.identity.remove_cached_auth_token(&token).await;
        }
        self.services.store.clear_session().await?;

        self.user = None;
        self.profile = None;
        self.last_roast = None;
        self.last_polish = None;
        self.current_tab_url = None;
        self.status = PanelStatus::idle();
        self.state = PanelState::Unauthenticated;
        tracing::info!("[Panel] Signed out");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Page tracking
    // ------------------------------------------------------------------

    pub async fn handle_message(&mut self, message: Message) -> Result<()> {
        if !self.state.is_authenticated() {
            tracing::debug!("[Panel] Signed out, ignoring {}", message.kind());
            return Ok(());
        }

        match message {
            Message::ProfileDataReceived { data, url } => {
                self.accept_profile(data, url);
                Ok(())
            }
            Message::ValidProfilePage { .. } => self.check_current_page().await,
            Message::NotProfilePage => {
                self.reset_to_idle();
                Ok(())
            }
            other => {
                tracing::debug!("[Panel] Ignoring {}", other.kind());
                Ok(())
            }
        }
    }

    /// Classifies the active tab and, on a profile page, asks the router for its data.
    pub async fn check_current_page(&mut self) -> Result<()> {
        if !self.state.is_authenticated() {
            return Ok(());
        }

        let url = match self.services.tabs.active_tab().await {
            Ok(tab) => tab.and_then(|tab| tab.url),
            Err(err) => {
                tracing::warn!("[Panel] Error checking current page: {}", err);
                return Ok(());
            }
        };

        let page = TabPageState::classify(url.as_deref());
        let url = match page {
            TabPageState::ValidProfilePage { url } => url,
            TabPageState::NotProfilePage => {
                self.current_tab_url = url;
                self.reset_to_idle();
                return Ok(());
            }
        };

        self.current_tab_url = Some(url.clone());
        self.status = PanelStatus::ready(STATUS_FETCHING);
        self.set_activity(ActivityState::Fetching);

        tokio::time::sleep(self.config.page_fetch_delay()).await;

        match self.services.router.send(Message::GetProfileData).await {
            RouterResponse::ProfileData { data } => self.accept_profile(data, url),
            RouterResponse::Failure { error } => {
                tracing::error!("[Panel] Extraction error: {}", error);
                self.status = PanelStatus::error(error.clone());
                self.set_activity(ActivityState::Error(PanelError::recoverable(error)));
            }
            other => {
                tracing::warn!("[Panel] Unexpected GET_PROFILE_DATA reply: {:?}", other);
                self.status = PanelStatus::error(STATUS_EXTRACTION_FAILED);
                self.set_activity(ActivityState::Error(PanelError::recoverable(
                    STATUS_EXTRACTION_FAILED,
                )));
            }
        }
        Ok(())
    }

    /// Takes a freshly extracted profile if `url` is a profile page for the tab in view.
    pub fn accept_profile(&mut self, data: ProfileRecord, url: String) {
        if !is_profile_page(&url) {
            // Outside a fetch the status keeps describing the profile on screen.
            if self.state.activity() == Some(&ActivityState::Fetching) {
                self.status = PanelStatus::error(STATUS_INVALID_URL);
                self.set_activity(ActivityState::Error(PanelError::fatal(STATUS_INVALID_URL)));
            } else {
                tracing::debug!("[Panel] Ignoring profile data for non-profile URL {}", url);
            }
            return;
        }

        if let Some(current) = self.current_tab_url.as_deref() {
            if profile_handle(current).is_some_and(|handle| Some(handle) != profile_handle(&url)) {
                tracing::debug!("[Panel] Ignoring profile data for {}, tab shows {}", url, current);
                return;
            }
        }

        let same_person = self
            .profile
            .as_ref()
            .is_some_and(|previous| profile_handle(&previous.url) == profile_handle(&url));
        if !same_person {
            self.last_roast = None;
            self.last_polish = None;
        }

        tracing::info!("[Panel] Profile ready: {}", data.display_name());
        self.profile = Some(data.anchored_at(&url));
        self.status = PanelStatus::ready(STATUS_READY);
        self.set_activity(ActivityState::Ready);
    }

    fn reset_to_idle(&mut self) {
        self.profile = None;
        self.status = PanelStatus::idle();
        self.set_activity(ActivityState::Idle);
    }

    // ------------------------------------------------------------------
    // Roast & polish
    // ------------------------------------------------------------------

    /// Runs the daily gate, then asks for a roast of the current profile.
    ///
    /// A permitted roast is counted even if generation then fails.
    pub async fn roast(&mut self) -> Result<()> {
        let Some(profile) = self.profile.clone() else {
            self.notify(NOTICE_NO_PROFILE);
            return Ok(());
        };
        let Some(previous) = self.state.activity().cloned() else {
            return Ok(());
        };
        if !previous.accepts_requests() {
            tracing::debug!("[Panel] Roast requested while {:?}", previous);
            return Ok(());
        }

        self.set_activity(ActivityState::Roasting);

        let allowance = match self
            .services
            .store
            .consume_roast(self.config.daily_roast_limit, self.is_pro())
            .await
        {
            Ok(allowance) => allowance,
            Err(err) => {
                self.set_activity(previous);
                return Err(err);
            }
        };

        if let RoastAllowance::Denied { count } = allowance {
            tracing::info!("[Panel] Daily roast limit reached ({})", count);
            self.notify(share::limit_reached_notice(&self.config));
            self.set_activity(ActivityState::Ready);
            return Ok(());
        }

        let screenshot = self.capture_screenshot().await;

        match self
            .services
            .generation
            .roast(&profile, screenshot.as_deref())
            .await
        {
            Ok(roast) => {
                self.last_roast = Some(roast);
                self.set_activity(ActivityState::RoastDisplayed);
            }
            Err(err) => {
                tracing::error!("[Panel] Error generating roast: {}", err);
                self.notify(NOTICE_ROAST_FAILED);
                self.set_activity(ActivityState::Error(PanelError::recoverable(
                    err.to_string(),
                )));
            }
        }
        Ok(())
    }

    async fn capture_screenshot(&self) -> Option<String> {
        match self.services.router.send(Message::CaptureScreenshot).await {
            RouterResponse::Screenshot { data_url } => Some(data_url),
            other => {
                tracing::warn!(
                    "[Panel] Screenshot unavailable: {}",
                    other.error_message().unwrap_or("no reply")
                );
                None
            }
        }
    }

    /// Pro-only rewrite of the current profile, grounded in the last roast.
    pub async fn polish(&mut self) -> Result<()> {
        if !self.is_pro() {
            self.notify(NOTICE_POLISH_PRO_ONLY);
            return Ok(());
        }
        let Some(profile) = self.profile.clone() else {
            self.notify(NOTICE_POLISH_NO_PROFILE);
            return Ok(());
        };
        if !self.state.activity().is_some_and(ActivityState::accepts_requests) {
            return Ok(());
        }

        self.set_activity(ActivityState::Polishing);

        match self
            .services
            .generation
            .polish(&profile, self.last_roast.as_ref())
            .await
        {
            Ok(polished) => {
                self.last_polish = Some(polished);
                self.set_activity(ActivityState::PolishDisplayed);
            }
            Err(err) => {
                tracing::error!("[Panel] Optimization failed: {}", err);
                self.notify(NOTICE_POLISH_FAILED);
                self.set_activity(ActivityState::Error(PanelError::recoverable(
                    err.to_string(),
                )));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Presentation helpers
    // ------------------------------------------------------------------

    /// `"{remaining}/{limit}"` for free users, `None` for Pro.
    pub async fn usage_summary(&self) -> Result<Option<String>> {
        if self.is_pro() {
            return Ok(None);
        }
        let usage = self.services.store.usage().await?;
        let limit = self.config.daily_roast_limit;
        Ok(Some(format!("{}/{}", usage.remaining(limit), limit)))
    }

    pub fn roast_share_text(&self) -> Option<String> {
        let roast = self.last_roast.as_ref()?;
        let name = self.profile.as_ref().and_then(|p| p.name.as_deref());
        Some(share::roast_share_text(name, roast))
    }

    pub fn upgrade_url(&self) -> Result<Url> {
        let email = self.user.as_ref().map(|u| u.email.as_str()).unwrap_or("");
        share::upgrade_url(&self.config, email)
    }

    /// Processes router broadcasts until the channel closes.
    pub async fn run(&mut self, mut inbox: broadcast::Receiver<Message>) {
        loop {
            match inbox.recv().await {
                Ok(message) => {
                    if let Err(err) = self.handle_message(message).await {
                        tracing::error!("[Panel] Failed to handle message: {}", err);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Panel] Missed {} broadcasts", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
