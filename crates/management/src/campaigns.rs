//! Campaign lifecycle operations that do not send anything: create, list,
//! inspect, pause, delete.

use std::sync::Arc;

use tracing::info;
use zaptos_core::types::new_campaign_id;
use zaptos_core::{Campaign, CampaignSource, CampaignStatus, ZaptosError, ZaptosResult};

use crate::store::CampaignStore;

/// Input for [`CampaignManager::create`]. Exactly one source is used; a CSV
/// path takes precedence over a CRM tag.
#[derive(Debug, Clone, Default)]
pub struct NewCampaign {
    pub name: String,
    pub template: String,
    pub contacts_file: Option<String>,
    pub crm_tag: Option<String>,
}

impl NewCampaign {
    fn source(&self) -> ZaptosResult<(CampaignSource, String)> {
        let filled = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        if let Some(path) = filled(&self.contacts_file) {
            return Ok((CampaignSource::Csv, path));
        }
        if let Some(tag) = filled(&self.crm_tag) {
            return Ok((CampaignSource::Crm, tag));
        }
        Err(ZaptosError::Validation(
            "Must provide --contacts or --ghl-tag".into(),
        ))
    }
}

pub struct CampaignManager {
    store: Arc<dyn CampaignStore>,
}

impl CampaignManager {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, req: NewCampaign) -> ZaptosResult<Campaign> {
        if req.name.trim().is_empty() {
            return Err(ZaptosError::Validation("campaign name must not be empty".into()));
        }
        if req.template.is_empty() {
            return Err(ZaptosError::Validation("campaign template must not be empty".into()));
        }
        let (source, source_config) = req.source()?;

        let mut campaigns = self.store.load()?;
        let mut campaign = Campaign::new(req.name, req.template, source, source_config);
        while campaigns.contains_key(&campaign.id) {
            campaign.id = new_campaign_id();
        }
        campaigns.insert(campaign.id.clone(), campaign.clone());
        self.store.save(&campaigns)?;

        info!(campaign_id = %campaign.id, name = %campaign.name, source = %campaign.source, "Campaign created");
        Ok(campaign)
    }

    /// Newest first, optionally restricted to one status.
    pub fn list(&self, status: Option<CampaignStatus>) -> ZaptosResult<Vec<Campaign>> {
        let mut campaigns: Vec<Campaign> = self
            .store
            .load()?
            .into_values()
            .filter(|c| status.map_or(true, |s| c.status == s))
            .collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(campaigns)
    }

    pub fn status(&self, id: &str) -> ZaptosResult<Campaign> {
        self.store.get(id)
    }

    /// Mark a campaign paused. A run in progress observes this before its
    /// next send and stops; the next `start` resumes from the checkpoint.
    pub fn pause(&self, id: &str) -> ZaptosResult<Campaign> {
        let mut campaigns = self.store.load()?;
        let campaign = campaigns
            .get_mut(id)
            .ok_or_else(|| ZaptosError::NotFound(format!("campaign {id} not found")))?;
        if campaign.status.is_terminal() {
            return Err(ZaptosError::InvalidState(format!(
                "campaign {id} is {} and cannot be paused",
                campaign.status
            )));
        }
        campaign.status = CampaignStatus::Paused;
        let paused = campaign.clone();
        self.store.save(&campaigns)?;

        info!(campaign_id = %id, "Campaign paused");
        Ok(paused)
    }

    pub fn delete(&self, id: &str) -> ZaptosResult<Campaign> {
        let removed = self.store.remove(id)?;
        info!(campaign_id = %id, "Campaign deleted");
        Ok(removed)
    }
}
