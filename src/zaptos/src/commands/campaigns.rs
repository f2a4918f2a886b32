use clap::Subcommand;
use serde_json::{json, Value};
use zaptos_core::{CampaignStatus, ZaptosResult};
use zaptos_management::NewCampaign;

use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum CampaignsCommand {
    /// Create a new campaign
    Create {
        /// Campaign name
        #[arg(long)]
        name: String,

        /// CSV file with contacts (header: number,name,...)
        #[arg(long)]
        contacts: Option<String>,

        /// GHL tag to fetch contacts from
        #[arg(long)]
        ghl_tag: Option<String>,

        /// Message body; `{{name}}` is replaced per recipient
        #[arg(long)]
        template: String,
    },

    /// List all campaigns
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
    },

    /// Start or resume a campaign
    Start { id: String },

    /// Pause a campaign; a running `start` stops before its next send
    Pause { id: String },

    /// Get campaign status
    Status { id: String },

    /// Delete a campaign
    Delete { id: String },
}

pub async fn run(cmd: CampaignsCommand, ctx: &Context) -> ZaptosResult<Value> {
    match cmd {
        CampaignsCommand::Create {
            name,
            contacts,
            ghl_tag,
            template,
        } => {
            let campaign = ctx.campaigns()?.create(NewCampaign {
                name,
                template,
                contacts_file: contacts,
                crm_tag: ghl_tag,
            })?;
            Ok(json!({
                "id": campaign.id,
                "status": campaign.status,
                "message": format!("Campaign '{}' created.", campaign.name),
            }))
        }
        CampaignsCommand::List { status } => {
            let status = status.as_deref().map(str::parse::<CampaignStatus>).transpose()?;
            Ok(serde_json::to_value(ctx.campaigns()?.list(status)?)?)
        }
        CampaignsCommand::Start { id } => {
            let executor = ctx.executor()?;
            Ok(serde_json::to_value(executor.start(&id).await?)?)
        }
        CampaignsCommand::Pause { id } => Ok(serde_json::to_value(ctx.campaigns()?.pause(&id)?)?),
        CampaignsCommand::Status { id } => Ok(serde_json::to_value(ctx.campaigns()?.status(&id)?)?),
        CampaignsCommand::Delete { id } => {
            let removed = ctx.campaigns()?.delete(&id)?;
            Ok(json!({"status": "deleted", "id": removed.id}))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zaptos_core::AppConfig;

    fn ctx_in(dir: &Path) -> Context {
        Context::new(AppConfig {
            campaigns_file: Some(dir.join("campaigns.json")),
            send_delay_ms: 0,
            ..Default::default()
        })
    }

    fn create(csv: &Path) -> CampaignsCommand {
        CampaignsCommand::Create {
            name: "Launch".into(),
            contacts: Some(csv.display().to_string()),
            ghl_tag: None,
            template: "Hello {{name}}".into(),
        }
    }

    #[tokio::test]
    async fn test_create_list_pause_delete() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(dir.path());

        let created = run(create(&dir.path().join("c.csv")), &ctx).await.unwrap();
        assert_eq!(created["status"], "created");
        assert_eq!(created["message"], "Campaign 'Launch' created.");
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 8);

        let listed = run(CampaignsCommand::List { status: None }, &ctx).await.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let paused = run(CampaignsCommand::Pause { id: id.clone() }, &ctx).await.unwrap();
        assert_eq!(paused["status"], "paused");
        assert_eq!(paused["id"], id.as_str());

        let filtered = run(
            CampaignsCommand::List {
                status: Some("created".into()),
            },
            &ctx,
        )
        .await
        .unwrap();
        assert!(filtered.as_array().unwrap().is_empty());

        let deleted = run(CampaignsCommand::Delete { id: id.clone() }, &ctx).await.unwrap();
        assert_eq!(deleted, json!({"status": "deleted", "id": id}));

        let err = run(CampaignsCommand::Status { id }, &ctx).await.unwrap_err();
        assert_eq!(err.kind(), "not_found_error");
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            CampaignsCommand::List {
                status: Some("archived".into()),
            },
            &ctx_in(dir.path()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[tokio::test]
    async fn test_start_without_credentials_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(dir.path());
        let created = run(create(&dir.path().join("c.csv")), &ctx).await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        let before = std::fs::read_to_string(dir.path().join("campaigns.json")).unwrap();

        let err = run(CampaignsCommand::Start { id }, &ctx).await.unwrap_err();

        assert_eq!(err.kind(), "configuration_error");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("campaigns.json")).unwrap(),
            before
        );
    }

    #[tokio::test]
    async fn test_start_sends_through_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/inst/send-text"))
            .and(header("token", "tok"))
            .and(body_json(json!({"number": "5511", "text": "Hello Ana"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/inst/send-text"))
            .and(body_json(json!({"number": "5533", "text": "Hello Caio"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("contacts.csv");
        std::fs::write(&csv, "number,name\n5511,Ana\n,Bo\n5533,Caio\n").unwrap();
        let ctx = Context::new(AppConfig {
            zaptos_instance: "inst".into(),
            zaptos_token: "tok".into(),
            zaptos_base_url: server.uri(),
            campaigns_file: Some(dir.path().join("campaigns.json")),
            send_delay_ms: 0,
            ..Default::default()
        });

        let created = run(create(&csv), &ctx).await.unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        let done = run(CampaignsCommand::Start { id: id.clone() }, &ctx).await.unwrap();

        assert_eq!(done["status"], "completed");
        assert_eq!(done["stats"], json!({"total": 2, "sent": 2, "failed": 0}));

        let status = run(CampaignsCommand::Status { id }, &ctx).await.unwrap();
        assert_eq!(status, done);
    }
}
