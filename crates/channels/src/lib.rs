//! Messaging provider integration: WhatsApp-business HTTP API client and the
//! transport seam the campaign executor sends through.

pub mod whatsapp;

pub use whatsapp::{MessageTransport, OutboundMessage, WhatsAppClient};
