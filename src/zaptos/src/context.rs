use std::sync::Arc;

use zaptos_cdp::{ContactSource, GhlClient};
use zaptos_channels::WhatsAppClient;
use zaptos_core::{AppConfig, ZaptosResult};
use zaptos_management::{
    CampaignExecutor, CampaignManager, CampaignStore, JsonFileStore, RecipientResolver,
};

/// Everything a command needs, built from the one `AppConfig` resolved at
/// startup. Clients are constructed on demand so a command only fails on the
/// credentials it actually uses.
pub struct Context {
    pub config: AppConfig,
}

impl Context {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn whatsapp(&self) -> ZaptosResult<WhatsAppClient> {
        WhatsAppClient::new(&self.config)
    }

    pub fn ghl(&self) -> ZaptosResult<GhlClient> {
        GhlClient::new(&self.config)
    }

    pub fn store(&self) -> ZaptosResult<Arc<dyn CampaignStore>> {
        Ok(Arc::new(JsonFileStore::from_config(&self.config)?))
    }

    pub fn campaigns(&self) -> ZaptosResult<CampaignManager> {
        Ok(CampaignManager::new(self.store()?))
    }

    /// Fails on missing messaging credentials. A missing CRM key is not an
    /// error here; it only fails CRM-sourced campaigns when they resolve.
    pub fn executor(&self) -> ZaptosResult<CampaignExecutor> {
        let transport = Arc::new(self.whatsapp()?);
        let crm: Option<Arc<dyn ContactSource>> = if self.config.has_ghl() {
            Some(Arc::new(self.ghl()?))
        } else {
            None
        };
        Ok(
            CampaignExecutor::new(self.store()?, transport, RecipientResolver::new(crm))
                .with_send_delay(self.config.send_delay()),
        )
    }
}
