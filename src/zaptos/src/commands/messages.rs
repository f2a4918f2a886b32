use std::path::Path;

use clap::{Args, Subcommand};
use serde_json::Value;
use zaptos_channels::OutboundMessage;
use zaptos_core::{ZaptosError, ZaptosResult};

use super::params;
use crate::context::Context;

#[derive(Subcommand, Debug)]
pub enum MessagesCommand {
    /// Send a message to a number
    Send(SendArgs),

    /// List message history
    List {
        /// Filter by contact number
        #[arg(long)]
        contact: Option<String>,

        /// Filter messages since date
        #[arg(long)]
        since: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct SendArgs {
    /// Destination phone number
    pub number: String,

    /// Text message content
    #[arg(long)]
    pub text: Option<String>,

    /// Image URL
    #[arg(long)]
    pub image: Option<String>,

    /// Caption for media (name for a location)
    #[arg(long)]
    pub caption: Option<String>,

    /// Buttons JSON: {"title", "buttons", "description"?}
    #[arg(long)]
    pub buttons: Option<String>,

    /// List JSON: {"title", "sections", "buttonText", "description"?}
    #[arg(long = "list")]
    pub list: Option<String>,

    /// Carousel cards as JSON or a path to a JSON file
    #[arg(long)]
    pub carousel: Option<String>,

    /// Location as "lat,long"
    #[arg(long)]
    pub location: Option<String>,

    /// Location address
    #[arg(long)]
    pub address: Option<String>,

    /// Contact card name
    #[arg(long)]
    pub contact_name: Option<String>,

    /// Contact card number
    #[arg(long)]
    pub contact_number: Option<String>,

    /// Document URL
    #[arg(long)]
    pub document: Option<String>,

    /// Document filename
    #[arg(long)]
    pub filename: Option<String>,

    /// Audio URL
    #[arg(long)]
    pub audio: Option<String>,

    /// Video URL
    #[arg(long)]
    pub video: Option<String>,

    /// Sticker URL
    #[arg(long)]
    pub sticker: Option<String>,
}

pub async fn run(cmd: MessagesCommand, ctx: &Context) -> ZaptosResult<Value> {
    match cmd {
        MessagesCommand::Send(args) => {
            let client = ctx.whatsapp()?;
            let message = build_message(&args)?;
            client.send(&args.number, &message).await
        }
        MessagesCommand::List { contact, since } => {
            let client = ctx.whatsapp()?;
            client
                .get("/messages", &params(&[("contact", contact), ("since", since)]))
                .await
        }
    }
}

fn parse_json(raw: &str, what: &str) -> ZaptosResult<Value> {
    serde_json::from_str(raw)
        .map_err(|e| ZaptosError::Validation(format!("Invalid JSON for {what}: {e}")))
}

fn required_str(doc: &Value, key: &str) -> Option<String> {
    doc.get(key).and_then(Value::as_str).map(String::from)
}

/// Turn the send flags into one message. Exactly one content flag must be
/// given; `--contact-name` and `--contact-number` count as one.
pub fn build_message(args: &SendArgs) -> ZaptosResult<OutboundMessage> {
    let has_contact = args.contact_name.is_some() || args.contact_number.is_some();
    let kinds = [
        args.text.is_some(),
        args.image.is_some(),
        args.buttons.is_some(),
        args.list.is_some(),
        args.carousel.is_some(),
        args.location.is_some(),
        has_contact,
        args.document.is_some(),
        args.audio.is_some(),
        args.video.is_some(),
        args.sticker.is_some(),
    ];
    match kinds.iter().filter(|k| **k).count() {
        0 => {
            return Err(ZaptosError::Validation(
                "No message content provided. Use --text, --image, etc.".into(),
            ))
        }
        1 => {}
        _ => {
            return Err(ZaptosError::Validation(
                "Only one message type can be sent at a time".into(),
            ))
        }
    }

    if let Some(text) = &args.text {
        return Ok(OutboundMessage::Text { text: text.clone() });
    }
    if let Some(url) = &args.image {
        return Ok(OutboundMessage::Image {
            url: url.clone(),
            caption: args.caption.clone(),
        });
    }
    if let Some(raw) = &args.buttons {
        let doc = parse_json(raw, "buttons")?;
        let (Some(title), Some(buttons)) = (required_str(&doc, "title"), doc.get("buttons")) else {
            return Err(ZaptosError::Validation(
                "Buttons JSON must contain 'title' and 'buttons' array".into(),
            ));
        };
        return Ok(OutboundMessage::Buttons {
            title,
            buttons: buttons.clone(),
            description: required_str(&doc, "description"),
        });
    }
    if let Some(raw) = &args.list {
        let doc = parse_json(raw, "list")?;
        let (Some(title), Some(sections), Some(button_text)) = (
            required_str(&doc, "title"),
            doc.get("sections"),
            required_str(&doc, "buttonText"),
        ) else {
            return Err(ZaptosError::Validation(
                "List JSON must contain 'title', 'sections', and 'buttonText'".into(),
            ));
        };
        return Ok(OutboundMessage::List {
            title,
            sections: sections.clone(),
            button_text,
            description: required_str(&doc, "description"),
        });
    }
    if let Some(raw) = &args.carousel {
        return Ok(OutboundMessage::Carousel {
            cards: carousel_cards(raw)?,
        });
    }
    if let Some(raw) = &args.location {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        let [latitude, longitude] = parts.as_slice() else {
            return Err(ZaptosError::Validation("Location must be 'lat,long'".into()));
        };
        return Ok(OutboundMessage::Location {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            address: args.address.clone(),
            name: args.caption.clone(),
        });
    }
    if has_contact {
        let (Some(name), Some(number)) = (&args.contact_name, &args.contact_number) else {
            return Err(ZaptosError::Validation(
                "--contact-name and --contact-number must be given together".into(),
            ));
        };
        return Ok(OutboundMessage::Contact {
            name: name.clone(),
            contact_number: number.clone(),
        });
    }
    if let Some(url) = &args.document {
        return Ok(OutboundMessage::Document {
            url: url.clone(),
            filename: args.filename.clone(),
            caption: args.caption.clone(),
        });
    }
    if let Some(url) = &args.audio {
        return Ok(OutboundMessage::Audio { url: url.clone() });
    }
    if let Some(url) = &args.video {
        return Ok(OutboundMessage::Video {
            url: url.clone(),
            caption: args.caption.clone(),
        });
    }
    match &args.sticker {
        Some(url) => Ok(OutboundMessage::Sticker { url: url.clone() }),
        None => Err(ZaptosError::Validation("No message content provided".into())),
    }
}

/// Inline JSON or a file path; `{"cards": [...]}` or a bare array.
fn carousel_cards(raw: &str) -> ZaptosResult<Value> {
    let path = Path::new(raw);
    let doc = if path.is_file() {
        super::read_json_file(path)?
    } else {
        serde_json::from_str(raw).map_err(|_| {
            ZaptosError::Validation("Invalid JSON or file path for carousel".into())
        })?
    };
    match doc {
        Value::Object(mut obj) => Ok(obj.remove("cards").unwrap_or(Value::Object(obj))),
        other => Ok(other),
    }
}
