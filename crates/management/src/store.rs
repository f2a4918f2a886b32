//! Campaign persistence backed by a single JSON document.
//!
//! Every write replaces the whole document. There is no locking: two processes
//! writing the same file race and the last writer wins. Fine for a
//! single-operator CLI; anything multi-process needs a versioned store behind
//! the same trait.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zaptos_core::{AppConfig, Campaign, ZaptosError, ZaptosResult};

/// All campaigns keyed by id, ordered so the document is stable on disk.
pub type CampaignMap = BTreeMap<String, Campaign>;

pub trait CampaignStore: Send + Sync {
    /// Read every campaign. A store that was never written is empty.
    fn load(&self) -> ZaptosResult<CampaignMap>;

    /// Replace the stored document with `campaigns`.
    fn save(&self, campaigns: &CampaignMap) -> ZaptosResult<()>;

    fn get(&self, id: &str) -> ZaptosResult<Campaign> {
        self.load()?
            .remove(id)
            .ok_or_else(|| ZaptosError::NotFound(format!("campaign {id} not found")))
    }

    fn upsert(&self, campaign: &Campaign) -> ZaptosResult<()> {
        let mut campaigns = self.load()?;
        campaigns.insert(campaign.id.clone(), campaign.clone());
        self.save(&campaigns)
    }

    /// Remove and return a campaign. Unknown ids leave the store untouched.
    fn remove(&self, id: &str) -> ZaptosResult<Campaign> {
        let mut campaigns = self.load()?;
        let removed = campaigns
            .remove(id)
            .ok_or_else(|| ZaptosError::NotFound(format!("campaign {id} not found")))?;
        self.save(&campaigns)?;
        Ok(removed)
    }
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured location (`<config_dir>/zaptos/campaigns.json`
    /// unless overridden).
    pub fn from_config(config: &AppConfig) -> ZaptosResult<Self> {
        Ok(Self::new(config.campaigns_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CampaignStore for JsonFileStore {
    fn load(&self) -> ZaptosResult<CampaignMap> {
        if !self.path.exists() {
            return Ok(CampaignMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(CampaignMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            ZaptosError::Store(format!(
                "campaign file {} is not valid: {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, campaigns: &CampaignMap) -> ZaptosResult<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        // Write beside the target and rename over it so readers never see a
        // half-written document.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, campaigns)?;
        tmp.write_all(b"\n")?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| ZaptosError::Io(e.error))?;

        debug!(path = %self.path.display(), campaigns = campaigns.len(), "Campaign store saved");
        Ok(())
    }
}
