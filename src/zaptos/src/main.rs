//! Zaptos CLI: WhatsApp messaging, GoHighLevel contact sync and local bulk
//! campaigns from one command line.

mod commands;
mod context;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use zaptos_core::config::ConfigOverrides;
use zaptos_core::AppConfig;

use commands::{
    analytics::AnalyticsCommand, campaigns::CampaignsCommand, contacts::ContactsCommand,
    conversations::ConversationsCommand, flows::FlowsCommand, messages::MessagesCommand,
    templates::TemplatesCommand, webhooks::WebhooksCommand,
};
use context::Context;
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "zaptos")]
#[command(about = "Zaptos WhatsApp API CLI Wrapper")]
#[command(version)]
struct Cli {
    /// Named profile from profiles.yaml
    #[arg(long, global = true, env = "ZAPTOS_PROFILE")]
    profile: Option<String>,

    /// Override ZAPTOS_INSTANCE
    #[arg(long, global = true)]
    instance: Option<String>,

    /// Override ZAPTOS_TOKEN
    #[arg(long, global = true)]
    token: Option<String>,

    /// Override GHL_API_KEY
    #[arg(long, global = true)]
    ghl_key: Option<String>,

    /// Override GHL_LOCATION_ID
    #[arg(long, global = true)]
    ghl_location: Option<String>,

    /// Output format: json or yaml
    #[arg(long, global = true)]
    output: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            profile: self.profile.clone(),
            zaptos_instance: self.instance.clone(),
            zaptos_token: self.token.clone(),
            ghl_api_key: self.ghl_key.clone(),
            ghl_location_id: self.ghl_location.clone(),
            output: self.output.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage and send messages
    Messages {
        #[command(subcommand)]
        action: MessagesCommand,
    },

    /// Manage contacts and GHL sync
    Contacts {
        #[command(subcommand)]
        action: ContactsCommand,
    },

    /// Manage bulk messaging campaigns
    Campaigns {
        #[command(subcommand)]
        action: CampaignsCommand,
    },

    /// Manage conversations (inbox)
    Conversations {
        #[command(subcommand)]
        action: ConversationsCommand,
    },

    /// Manage message templates
    Templates {
        #[command(subcommand)]
        action: TemplatesCommand,
    },

    /// Manage webhooks
    Webhooks {
        #[command(subcommand)]
        action: WebhooksCommand,
    },

    /// View analytics and reports
    Analytics {
        #[command(subcommand)]
        action: AnalyticsCommand,
    },

    /// Manage chatbot flows
    Flows {
        #[command(subcommand)]
        action: FlowsCommand,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries only the result document.
    let default_filter = if cli.debug { "zaptos=debug" } else { "zaptos=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Until configuration loads, only the --output flag can pick the format
    // of an error document.
    let mut format = cli
        .output
        .as_deref()
        .and_then(|o| OutputFormat::parse(o).ok())
        .unwrap_or_default();

    match run(cli, &mut format).await {
        Ok(value) => match format.render(&value) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => fail(format, anyhow::Error::from(e)),
        },
        Err(err) => fail(format, err),
    }
}

async fn run(cli: Cli, format: &mut OutputFormat) -> anyhow::Result<Value> {
    let config = AppConfig::load(&cli.overrides())?;
    execute(cli.command, config, format).await
}

/// Dispatch with a resolved configuration. `format` takes the configured
/// output before dispatch, so command errors render like results.
async fn execute(
    command: Commands,
    config: AppConfig,
    format: &mut OutputFormat,
) -> anyhow::Result<Value> {
    *format = OutputFormat::parse(&config.output)?;
    tracing::debug!(
        base_url = %config.zaptos_base_url,
        has_zaptos = config.has_zaptos(),
        has_ghl = config.has_ghl(),
        "Configuration loaded"
    );

    let ctx = Context::new(config);
    let value = match command {
        Commands::Messages { action } => commands::messages::run(action, &ctx).await?,
        Commands::Contacts { action } => commands::contacts::run(action, &ctx).await?,
        Commands::Campaigns { action } => commands::campaigns::run(action, &ctx).await?,
        Commands::Conversations { action } => commands::conversations::run(action, &ctx).await?,
        Commands::Templates { action } => commands::templates::run(action, &ctx).await?,
        Commands::Webhooks { action } => commands::webhooks::run(action, &ctx).await?,
        Commands::Analytics { action } => commands::analytics::run(action, &ctx).await?,
        Commands::Flows { action } => commands::flows::run(action, &ctx).await?,
    };
    Ok(value)
}

fn fail(format: OutputFormat, err: anyhow::Error) -> ExitCode {
    let doc = output::error_document(&err);
    let rendered = format
        .render(&doc)
        .unwrap_or_else(|_| doc.to_string());
    println!("{rendered}");
    eprintln!("Error: {err:#}");
    ExitCode::FAILURE
}
