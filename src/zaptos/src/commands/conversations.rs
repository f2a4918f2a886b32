use clap::Subcommand;
use serde_json::{json, Value};
use zaptos_core::ZaptosResult;

use super::params;
use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum ConversationsCommand {
    /// List conversations
    List {
        /// Show only unread
        #[arg(long, default_value_t = false)]
        unread: bool,

        /// Filter by assigned user
        #[arg(long)]
        assigned_to: Option<String>,
    },

    /// Get conversation details
    Get { number: String },

    /// Assign a conversation to a user
    Assign {
        number: String,

        /// User to assign to
        #[arg(long)]
        to: String,
    },

    /// Close a conversation
    Close { number: String },

    /// Search conversations
    Search {
        /// Search keyword
        #[arg(long)]
        query: String,
    },
}

pub async fn run(cmd: ConversationsCommand, ctx: &Context) -> ZaptosResult<Value> {
    let client = ctx.whatsapp()?;
    match cmd {
        ConversationsCommand::List {
            unread,
            assigned_to,
        } => {
            let query = params(&[
                ("unread", unread.then(|| "true".to_string())),
                ("assignedTo", assigned_to),
            ]);
            client.get("/conversations", &query).await
        }
        ConversationsCommand::Get { number } => {
            client.get(&format!("/conversations/{number}"), &[]).await
        }
        ConversationsCommand::Assign { number, to } => {
            client
                .post(&format!("/conversations/{number}/assign"), &json!({"user": to}))
                .await
        }
        ConversationsCommand::Close { number } => {
            client
                .post(&format!("/conversations/{number}/close"), &json!({}))
                .await
        }
        ConversationsCommand::Search { query } => {
            client
                .get("/conversations/search", &[("query", query)])
                .await
        }
    }
}
