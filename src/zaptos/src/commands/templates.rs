use std::path::PathBuf;

use clap::Subcommand;
use serde_json::{json, Value};
use zaptos_core::ZaptosResult;

use super::{read_json_file, with_name};
use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// List templates
    List,

    /// Get template details
    Get { name: String },

    /// Create a template from a JSON file
    Create {
        /// Template name
        #[arg(long)]
        name: String,

        /// Template JSON file
        #[arg(long)]
        file: PathBuf,
    },

    /// Replace a template from a JSON file
    Update {
        name: String,

        /// Template JSON file
        #[arg(long)]
        file: PathBuf,
    },

    /// Delete a template
    Delete { name: String },

    /// Send a template preview to a number
    Preview {
        name: String,

        /// Phone number to send the preview to
        #[arg(long)]
        number: String,
    },
}

pub async fn run(cmd: TemplatesCommand, ctx: &Context) -> ZaptosResult<Value> {
    let client = ctx.whatsapp()?;
    match cmd {
        TemplatesCommand::List => client.get("/templates", &[]).await,
        TemplatesCommand::Get { name } => client.get(&format!("/templates/{name}"), &[]).await,
        TemplatesCommand::Create { name, file } => {
            let body = with_name(read_json_file(&file)?, &name, true)?;
            client.post("/templates", &body).await
        }
        TemplatesCommand::Update { name, file } => {
            let body = with_name(read_json_file(&file)?, &name, true)?;
            client.put(&format!("/templates/{name}"), &body).await
        }
        TemplatesCommand::Delete { name } => client.delete(&format!("/templates/{name}")).await,
        TemplatesCommand::Preview { name, number } => {
            client
                .post(&format!("/templates/{name}/preview"), &json!({"number": number}))
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zaptos_core::AppConfig;

    #[tokio::test]
    async fn test_create_forces_cli_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/inst/templates"))
            .and(body_json(json!({"name": "welcome", "body": "Hi {{name}}"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"created": true})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("welcome.json");
        std::fs::write(&file, r#"{"name": "other", "body": "Hi {{name}}"}"#).unwrap();

        let ctx = Context::new(AppConfig {
            zaptos_instance: "inst".into(),
            zaptos_token: "tok".into(),
            zaptos_base_url: server.uri(),
            ..Default::default()
        });
        let created = run(
            TemplatesCommand::Create {
                name: "welcome".into(),
                file,
            },
            &ctx,
        )
        .await
        .unwrap();
        assert_eq!(created["created"], true);
    }

    #[tokio::test]
    async fn test_missing_file_is_validation_error() {
        let ctx = Context::new(AppConfig {
            zaptos_instance: "inst".into(),
            zaptos_token: "tok".into(),
            ..Default::default()
        });
        let err = run(
            TemplatesCommand::Update {
                name: "welcome".into(),
                file: PathBuf::from("/no/such/template.json"),
            },
            &ctx,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }
}
