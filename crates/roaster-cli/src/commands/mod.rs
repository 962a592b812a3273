pub mod generate;
pub mod headless;
pub mod page;
pub mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use roaster_application::{MessageRouter, PanelController, PanelServices};
use roaster_core::config::RoasterConfig;
use roaster_core::session::SessionStore;
use roaster_infrastructure::{
    BroadcastPanelChannel, ConfigService, FileStorageRepository, HttpGenerationService,
    HttpUserInfoService, RoasterPaths,
};

use headless::{ProfileFileTab, TokenIdentity};

/// Everything a command needs, wired once per invocation.
pub struct Runtime {
    pub paths: RoasterPaths,
    pub config: RoasterConfig,
    pub store: Arc<SessionStore>,
}

impl Runtime {
    pub fn load(paths: RoasterPaths) -> Result<Self> {
        let config = ConfigService::new(paths.config_file())
            .get_config()
            .context("Failed to load configuration")?;
        let storage = Arc::new(FileStorageRepository::new(paths.storage_file()));
        let store = Arc::new(SessionStore::with_system_clock(storage));

        Ok(Self {
            paths,
            config,
            store,
        })
    }

    /// Builds a panel on top of a router for `tab`.
    ///
    /// Without an explicit token the stored one is used for silent refreshes.
    pub async fn panel(
        &self,
        tab: ProfileFileTab,
        token: Option<String>,
    ) -> Result<PanelController> {
        let token = match token {
            Some(token) => Some(token),
            None => self.store.access_token().await?,
        };

        let tabs = Arc::new(tab);
        let router = Arc::new(MessageRouter::new(
            tabs.clone(),
            Arc::new(BroadcastPanelChannel::new()),
            self.store.clone(),
            self.config.injection_grace(),
        ));
        let services = PanelServices {
            store: self.store.clone(),
            router,
            tabs,
            identity: Arc::new(TokenIdentity::new(token)),
            user_info: Arc::new(HttpUserInfoService::from_config(&self.config)),
            generation: Arc::new(HttpGenerationService::from_config(&self.config)),
        };
        Ok(PanelController::new(services, self.config.clone()))
    }

    /// A panel with a restored session, or an error telling the user to sign in.
    pub async fn signed_in_panel(&self, tab: ProfileFileTab) -> Result<PanelController> {
        let mut panel = self.panel(tab, None).await?;
        panel.start().await?;
        if !panel.state().is_authenticated() {
            anyhow::bail!("Not signed in. Run `roaster sign-in --token <TOKEN>` first.");
        }
        Ok(panel)
    }
}
