use clap::Subcommand;
use serde_json::{json, Value};
use zaptos_core::{ZaptosError, ZaptosResult};

use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum WebhooksCommand {
    /// List webhooks
    List,

    /// Create a webhook
    Create {
        /// Webhook URL
        #[arg(long)]
        url: String,

        /// Comma-separated events
        #[arg(long)]
        events: String,
    },

    /// Delete a webhook
    Delete { id: String },

    /// Fire a test delivery
    Test { id: String },
}

fn event_list(events: &str) -> ZaptosResult<Vec<String>> {
    let list: Vec<String> = events
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(String::from)
        .collect();
    if list.is_empty() {
        return Err(ZaptosError::Validation("--events must name at least one event".into()));
    }
    Ok(list)
}

pub async fn run(cmd: WebhooksCommand, ctx: &Context) -> ZaptosResult<Value> {
    let client = ctx.whatsapp()?;
    match cmd {
        WebhooksCommand::List => client.get("/webhooks", &[]).await,
        WebhooksCommand::Create { url, events } => {
            let events = event_list(&events)?;
            client
                .post("/webhooks", &json!({"url": url, "events": events}))
                .await
        }
        WebhooksCommand::Delete { id } => client.delete(&format!("/webhooks/{id}")).await,
        WebhooksCommand::Test { id } => {
            client.post(&format!("/webhooks/{id}/test"), &json!({})).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zaptos_core::AppConfig;

    #[test]
    fn test_event_list_trims() {
        assert_eq!(
            event_list(" message.received, message.sent ,").unwrap(),
            vec!["message.received", "message.sent"]
        );
        assert!(event_list(" , ").is_err());
    }

    #[tokio::test]
    async fn test_create_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/inst/webhooks"))
            .and(body_json(json!({"url": "https://hook", "events": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "w1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/inst/webhooks/w1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = Context::new(AppConfig {
            zaptos_instance: "inst".into(),
            zaptos_token: "tok".into(),
            zaptos_base_url: server.uri(),
            ..Default::default()
        });

        let created = run(
            WebhooksCommand::Create {
                url: "https://hook".into(),
                events: "a,b".into(),
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(created["id"], "w1");

        let deleted = run(WebhooksCommand::Delete { id: "w1".into() }, &ctx)
            .await
            .unwrap();
        assert_eq!(deleted, Value::Null);
    }
}
