use clap::Subcommand;
use serde_json::{json, Value};
use tracing::{info, warn};
use zaptos_cdp::{ContactSource, CrmContact};
use zaptos_channels::WhatsAppClient;
use zaptos_core::{ZaptosError, ZaptosResult};

use super::params;
use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum ContactsCommand {
    /// List contacts
    List {
        /// Limit results
        #[arg(long, default_value_t = 20)]
        limit: u32,

        /// Search query
        #[arg(long)]
        query: Option<String>,
    },

    /// Get contact details
    Get { number: String },

    /// Create or update a contact
    Create {
        /// Phone number
        #[arg(long)]
        number: String,

        /// Contact name
        #[arg(long)]
        name: String,
    },

    /// Copy contacts from GoHighLevel into Zaptos
    SyncGhl {
        /// Only contacts carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Contacts fetched when no tag is given
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },

    /// Push a Zaptos contact to GoHighLevel
    PushGhl { number: String },
}

pub async fn run(cmd: ContactsCommand, ctx: &Context) -> ZaptosResult<Value> {
    match cmd {
        ContactsCommand::List { limit, query } => {
            let client = ctx.whatsapp()?;
            client
                .get(
                    "/contacts",
                    &params(&[("limit", Some(limit.to_string())), ("query", query)]),
                )
                .await
        }
        ContactsCommand::Get { number } => {
            let client = ctx.whatsapp()?;
            fetch_contact(&client, &number).await
        }
        ContactsCommand::Create { number, name } => {
            let client = ctx.whatsapp()?;
            client
                .post("/contacts", &json!({"number": number, "name": name}))
                .await
        }
        ContactsCommand::SyncGhl { tag, limit } => {
            let client = ctx.whatsapp()?;
            let ghl = ctx.ghl()?;
            info!("Fetching contacts from GHL");
            let contacts = match tag.as_deref() {
                Some(tag) => ghl.contacts_by_tag(tag).await?,
                None => ghl.get_contacts(None, limit).await?,
            };
            let synced = sync_contacts(&client, &contacts).await;
            info!(synced, total = contacts.len(), "GHL sync finished");
            Ok(json!({"synced": synced, "total_ghl": contacts.len()}))
        }
        ContactsCommand::PushGhl { number } => {
            let client = ctx.whatsapp()?;
            let ghl = ctx.ghl()?;
            let found = fetch_contact(&client, &number).await?;
            let contact = CrmContact {
                name: Some(
                    found
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown")
                        .to_string(),
                ),
                phone: Some(
                    found
                        .get("number")
                        .and_then(Value::as_str)
                        .unwrap_or(&number)
                        .to_string(),
                ),
                ..Default::default()
            };
            ghl.create_contact(&contact).await
        }
    }
}

/// The provider answers a number lookup with either one object or a list.
async fn fetch_contact(client: &WhatsAppClient, number: &str) -> ZaptosResult<Value> {
    let result = client
        .get("/contacts", &[("number", number.to_string())])
        .await?;
    match result {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| ZaptosError::NotFound(format!("contact {number} not found in Zaptos"))),
        other => Ok(other),
    }
}

/// Copy contacts that have both a phone and a name. Individual failures are
/// logged and skipped.
async fn sync_contacts(client: &WhatsAppClient, contacts: &[CrmContact]) -> usize {
    let mut synced = 0;
    for contact in contacts {
        let (Some(phone), Some(name)) = (contact.phone.as_deref(), contact.name.as_deref()) else {
            continue;
        };
        match client
            .post("/contacts", &json!({"number": phone, "name": name}))
            .await
        {
            Ok(_) => synced += 1,
            Err(e) => warn!(name, phone, error = %e, "Failed to sync contact"),
        }
    }
    synced
}
