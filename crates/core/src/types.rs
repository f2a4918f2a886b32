//! Campaign domain types shared by the store, the resolver and the executor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ZaptosError;

// ─── Campaign ──────────────────────────────────────────────────────────────

/// A persisted bulk-send job and its run-time progress counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: CampaignStatus,
    pub template: String,
    pub source: CampaignSource,
    /// CSV file path for `csv`, tag name for `crm`.
    pub source_config: String,
    #[serde(default)]
    pub stats: CampaignStats,
}

impl Campaign {
    pub fn new(
        name: impl Into<String>,
        template: impl Into<String>,
        source: CampaignSource,
        source_config: impl Into<String>,
    ) -> Self {
        Self {
            id: new_campaign_id(),
            name: name.into(),
            created_at: Utc::now(),
            status: CampaignStatus::Created,
            template: template.into(),
            source,
            source_config: source_config.into(),
            stats: CampaignStats::default(),
        }
    }
}

/// Short opaque id: the first 8 hex characters of a v4 UUID.
pub fn new_campaign_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Created,
    Running,
    Paused,
    Completed,
    Failed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Created => "created",
            CampaignStatus::Running => "running",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Completed | CampaignStatus::Failed)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = ZaptosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" => Ok(CampaignStatus::Created),
            "running" => Ok(CampaignStatus::Running),
            "paused" => Ok(CampaignStatus::Paused),
            "completed" => Ok(CampaignStatus::Completed),
            "failed" => Ok(CampaignStatus::Failed),
            other => Err(ZaptosError::Validation(format!(
                "unknown campaign status '{other}'"
            ))),
        }
    }
}

/// Where the recipient list of a campaign comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignSource {
    Csv,
    /// Older campaign files spell this `ghl`.
    #[serde(alias = "ghl")]
    Crm,
}

impl fmt::Display for CampaignSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignSource::Csv => f.write_str("csv"),
            CampaignSource::Crm => f.write_str("crm"),
        }
    }
}

/// Progress counters. `sent` and `failed` never decrease; `total` stays 0
/// until recipients are resolved at start time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CampaignStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub failed: u64,
}

impl CampaignStats {
    /// Number of send attempts already checkpointed.
    pub fn attempted(&self) -> u64 {
        self.sent + self.failed
    }
}

// ─── Recipient ─────────────────────────────────────────────────────────────

/// One resolved send target. Derived per run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub number: String,
    pub display_name: Option<String>,
}

impl Recipient {
    pub fn new(number: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            number: number.into(),
            display_name,
        }
    }

    pub fn has_number(&self) -> bool {
        !self.number.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_campaign_defaults() {
        let campaign = Campaign::new("Launch", "Hi {{name}}", CampaignSource::Csv, "people.csv");
        assert_eq!(campaign.status, CampaignStatus::Created);
        assert_eq!(campaign.stats, CampaignStats::default());
        assert_eq!(campaign.id.len(), 8);
        assert!(campaign.id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_campaign_json_shape() {
        let campaign = Campaign::new("Launch", "Hi", CampaignSource::Crm, "vip");
        let value = serde_json::to_value(&campaign).unwrap();
        assert_eq!(value["status"], "created");
        assert_eq!(value["source"], "crm");
        assert_eq!(value["source_config"], "vip");
        assert_eq!(value["stats"], serde_json::json!({"total": 0, "sent": 0, "failed": 0}));
    }

    #[test]
    fn test_legacy_ghl_source_is_read_as_crm() {
        let raw = serde_json::json!({
            "id": "ab12cd34",
            "name": "Old",
            "created_at": "2024-05-01T10:00:00Z",
            "status": "paused",
            "template": "Hello",
            "source": "ghl",
            "source_config": "customers",
            "stats": {"total": 3, "sent": 1, "failed": 0}
        });
        let campaign: Campaign = serde_json::from_value(raw).unwrap();
        assert_eq!(campaign.source, CampaignSource::Crm);
        assert_eq!(campaign.status, CampaignStatus::Paused);
        assert_eq!(campaign.stats.attempted(), 1);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Completed".parse::<CampaignStatus>().unwrap(), CampaignStatus::Completed);
        assert!("archived".parse::<CampaignStatus>().is_err());
        assert!(CampaignStatus::Failed.is_terminal());
        assert!(!CampaignStatus::Paused.is_terminal());
    }
}
