use clap::{Subcommand, ValueEnum};
use serde_json::Value;
use zaptos_core::ZaptosResult;

use super::params;
use crate::context::Context;

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ExportFormat {
    Csv,
    #[default]
    Json,
}

impl ExportFormat {
    fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AnalyticsCommand {
    /// Analytics summary for a period
    Summary {
        #[arg(long, value_enum, default_value_t = Period::Day)]
        period: Period,
    },

    /// Provider-side analytics for one campaign
    Campaign { id: String },

    /// Message analytics
    Messages {
        /// Start date
        #[arg(long)]
        since: Option<String>,

        /// End date
        #[arg(long)]
        until: Option<String>,
    },

    /// Conversation analytics
    Conversations {
        /// Start date
        #[arg(long)]
        since: Option<String>,
    },

    /// Export analytics data
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
}

pub async fn run(cmd: AnalyticsCommand, ctx: &Context) -> ZaptosResult<Value> {
    let client = ctx.whatsapp()?;
    match cmd {
        AnalyticsCommand::Summary { period } => {
            client
                .get("/analytics/summary", &[("period", period.as_str().to_string())])
                .await
        }
        AnalyticsCommand::Campaign { id } => {
            client.get(&format!("/analytics/campaign/{id}"), &[]).await
        }
        AnalyticsCommand::Messages { since, until } => {
            client
                .get("/analytics/messages", &params(&[("since", since), ("until", until)]))
                .await
        }
        AnalyticsCommand::Conversations { since } => {
            client
                .get("/analytics/conversations", &params(&[("since", since)]))
                .await
        }
        AnalyticsCommand::Export { format } => {
            client
                .get("/analytics/export", &[("format", format.as_str().to_string())])
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zaptos_core::AppConfig;

    #[tokio::test]
    async fn test_summary_sends_period() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/inst/analytics/summary"))
            .and(query_param("period", "week"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sent": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = Context::new(AppConfig {
            zaptos_instance: "inst".into(),
            zaptos_token: "tok".into(),
            zaptos_base_url: server.uri(),
            ..Default::default()
        });
        let summary = run(AnalyticsCommand::Summary { period: Period::Week }, &ctx)
            .await
            .unwrap();
        assert_eq!(summary["sent"], 42);
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/inst/analytics/campaign/abc"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such campaign"))
            .mount(&server)
            .await;

        let ctx = Context::new(AppConfig {
            zaptos_instance: "inst".into(),
            zaptos_token: "tok".into(),
            zaptos_base_url: server.uri(),
            ..Default::default()
        });
        let err = run(AnalyticsCommand::Campaign { id: "abc".into() }, &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
