//! Campaign run loop.
//!
//! Lifecycle: `created -> running -> completed`, with `running -> paused`,
//! `running -> failed` and `paused -> running`. `completed` and `failed` are
//! terminal. Sends are strictly sequential and the record is checkpointed
//! after every attempt, so a killed process loses at most the one in-flight
//! send and the next `start` resumes after the last checkpointed recipient.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use zaptos_channels::MessageTransport;
use zaptos_core::templates::render;
use zaptos_core::{Campaign, CampaignStatus, ZaptosError, ZaptosResult};

use crate::resolver::RecipientResolver;
use crate::store::CampaignStore;

/// Pause between two consecutive sends.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(2);

pub struct CampaignExecutor {
    store: Arc<dyn CampaignStore>,
    transport: Arc<dyn MessageTransport>,
    resolver: RecipientResolver,
    send_delay: Duration,
}

impl CampaignExecutor {
    pub fn new(
        store: Arc<dyn CampaignStore>,
        transport: Arc<dyn MessageTransport>,
        resolver: RecipientResolver,
    ) -> Self {
        Self {
            store,
            transport,
            resolver,
            send_delay: DEFAULT_SEND_DELAY,
        }
    }

    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Run (or resume) a campaign to completion, to a pause, or to failure.
    ///
    /// Resolution errors mark the campaign `failed` and are returned.
    /// Individual send errors are counted in `stats.failed` and never abort
    /// the run.
    pub async fn start(&self, id: &str) -> ZaptosResult<Campaign> {
        let mut campaign = self.store.get(id)?;
        match campaign.status {
            CampaignStatus::Completed => {
                return Err(ZaptosError::InvalidState(format!(
                    "campaign {id} already completed"
                )))
            }
            CampaignStatus::Failed => {
                return Err(ZaptosError::InvalidState(format!(
                    "campaign {id} failed and cannot be restarted"
                )))
            }
            CampaignStatus::Running => {
                warn!(campaign_id = %id, "Campaign was left running, resuming from last checkpoint")
            }
            CampaignStatus::Created | CampaignStatus::Paused => {}
        }

        info!(campaign_id = %id, name = %campaign.name, "Starting campaign");
        campaign.status = CampaignStatus::Running;
        self.store.upsert(&campaign)?;

        let recipients = match self
            .resolver
            .resolve(campaign.source, &campaign.source_config)
            .await
        {
            Ok(recipients) => recipients,
            Err(e) => {
                error!(campaign_id = %id, error = %e, "Recipient resolution failed");
                campaign.status = CampaignStatus::Failed;
                self.checkpoint(&mut campaign)?;
                return Err(e);
            }
        };

        // A source that shrank since the last run must not leave more
        // attempts on record than the total.
        campaign.stats.total = (recipients.len() as u64).max(campaign.stats.attempted());
        let resume_from = (campaign.stats.attempted() as usize).min(recipients.len());
        if resume_from > 0 {
            info!(campaign_id = %id, skipped = resume_from, "Resuming after checkpointed recipients");
        }
        self.checkpoint(&mut campaign)?;

        let pending = &recipients[resume_from..];
        for (i, recipient) in pending.iter().enumerate() {
            if self.pause_requested(&mut campaign)? {
                info!(campaign_id = %id, sent = campaign.stats.sent, failed = campaign.stats.failed, "Campaign paused");
                return Ok(campaign);
            }

            if !recipient.has_number() {
                debug!(campaign_id = %id, "Recipient without number skipped");
                continue;
            }

            let text = render(&campaign.template, recipient);
            match self.transport.send_text(&recipient.number, &text).await {
                Ok(_) => {
                    campaign.stats.sent += 1;
                    metrics::counter!("campaign.messages_sent").increment(1);
                    info!(campaign_id = %id, number = %recipient.number, "Sent");
                }
                Err(e) => {
                    campaign.stats.failed += 1;
                    metrics::counter!("campaign.messages_failed").increment(1);
                    warn!(campaign_id = %id, number = %recipient.number, error = %e, "Failed to send");
                }
            }
            self.checkpoint(&mut campaign)?;

            if i + 1 < pending.len() && !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }
        }

        campaign.status = CampaignStatus::Completed;
        self.checkpoint(&mut campaign)?;
        info!(
            campaign_id = %id,
            total = campaign.stats.total,
            sent = campaign.stats.sent,
            failed = campaign.stats.failed,
            "Campaign completed"
        );
        Ok(campaign)
    }

    /// Re-read the stored status. An external `pause` is adopted into the
    /// in-memory record.
    fn pause_requested(&self, campaign: &mut Campaign) -> ZaptosResult<bool> {
        let stored = self.store.get(&campaign.id)?;
        if stored.status == CampaignStatus::Paused {
            campaign.status = CampaignStatus::Paused;
        }
        Ok(campaign.status == CampaignStatus::Paused)
    }

    /// Write the full record back. A pause written by another process while
    /// we were sending is kept rather than overwritten, and a record deleted
    /// mid-run is not resurrected.
    fn checkpoint(&self, campaign: &mut Campaign) -> ZaptosResult<()> {
        let mut campaigns = self.store.load()?;
        let stored = campaigns.get(&campaign.id).ok_or_else(|| {
            ZaptosError::NotFound(format!("campaign {} was deleted while running", campaign.id))
        })?;
        if stored.status == CampaignStatus::Paused && campaign.status == CampaignStatus::Running {
            campaign.status = CampaignStatus::Paused;
        }
        campaigns.insert(campaign.id.clone(), campaign.clone());
        self.store.save(&campaigns)
    }
}
