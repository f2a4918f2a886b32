//! WhatsApp Business API integration for conversational messaging.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Map, Value};
use zaptos_core::http::send_json;
use zaptos_core::{AppConfig, ZaptosError, ZaptosResult};

/// One outbound message, as accepted by the provider's `send-*` endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    Image {
        url: String,
        caption: Option<String>,
    },
    Buttons {
        title: String,
        buttons: Value,
        description: Option<String>,
    },
    List {
        title: String,
        sections: Value,
        button_text: String,
        description: Option<String>,
    },
    Carousel {
        cards: Value,
    },
    Location {
        latitude: String,
        longitude: String,
        address: Option<String>,
        name: Option<String>,
    },
    Contact {
        name: String,
        contact_number: String,
    },
    Document {
        url: String,
        filename: Option<String>,
        caption: Option<String>,
    },
    Audio {
        url: String,
    },
    Video {
        url: String,
        caption: Option<String>,
    },
    Sticker {
        url: String,
    },
}

impl OutboundMessage {
    pub fn endpoint(&self) -> &'static str {
        match self {
            OutboundMessage::Text { .. } => "/send-text",
            OutboundMessage::Image { .. } => "/send-image",
            OutboundMessage::Buttons { .. } => "/send-buttons",
            OutboundMessage::List { .. } => "/send-list",
            OutboundMessage::Carousel { .. } => "/send-carousel",
            OutboundMessage::Location { .. } => "/send-location",
            OutboundMessage::Contact { .. } => "/send-contact",
            OutboundMessage::Document { .. } => "/send-document",
            OutboundMessage::Audio { .. } => "/send-audio",
            OutboundMessage::Video { .. } => "/send-video",
            OutboundMessage::Sticker { .. } => "/send-sticker",
        }
    }

    /// JSON body for `number`. Absent optional fields are left out.
    pub fn payload(&self, number: &str) -> Value {
        let mut body = Map::new();
        body.insert("number".into(), json!(number));

        let mut put = |key: &str, value: Value| {
            body.insert(key.to_string(), value);
        };
        match self {
            OutboundMessage::Text { text } => put("text", json!(text)),
            OutboundMessage::Image { url, caption } => {
                put("url", json!(url));
                if let Some(caption) = caption {
                    put("caption", json!(caption));
                }
            }
            OutboundMessage::Buttons {
                title,
                buttons,
                description,
            } => {
                put("title", json!(title));
                put("buttons", buttons.clone());
                if let Some(description) = description {
                    put("description", json!(description));
                }
            }
            OutboundMessage::List {
                title,
                sections,
                button_text,
                description,
            } => {
                put("title", json!(title));
                put("sections", sections.clone());
                put("buttonText", json!(button_text));
                if let Some(description) = description {
                    put("description", json!(description));
                }
            }
            OutboundMessage::Carousel { cards } => put("cards", cards.clone()),
            OutboundMessage::Location {
                latitude,
                longitude,
                address,
                name,
            } => {
                put("latitude", json!(latitude));
                put("longitude", json!(longitude));
                if let Some(address) = address {
                    put("address", json!(address));
                }
                if let Some(name) = name {
                    put("name", json!(name));
                }
            }
            OutboundMessage::Contact {
                name,
                contact_number,
            } => {
                put("name", json!(name));
                put("contactNumber", json!(contact_number));
            }
            OutboundMessage::Document {
                url,
                filename,
                caption,
            } => {
                put("url", json!(url));
                if let Some(filename) = filename {
                    put("filename", json!(filename));
                }
                if let Some(caption) = caption {
                    put("caption", json!(caption));
                }
            }
            OutboundMessage::Audio { url } | OutboundMessage::Sticker { url } => {
                put("url", json!(url))
            }
            OutboundMessage::Video { url, caption } => {
                put("url", json!(url));
                if let Some(caption) = caption {
                    put("caption", json!(caption));
                }
            }
        }
        Value::Object(body)
    }
}

/// Sends one rendered campaign message. Implemented by [`WhatsAppClient`];
/// tests substitute fakes.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send_text(&self, number: &str, text: &str) -> ZaptosResult<Value>;
}

/// HTTP client bound to one provider instance, authenticated with a static
/// `token` header.
pub struct WhatsAppClient {
    http: reqwest::Client,
    base_url: String,
}

impl WhatsAppClient {
    pub fn new(config: &AppConfig) -> ZaptosResult<Self> {
        config.require_zaptos()?;

        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&config.zaptos_token)
            .map_err(|e| ZaptosError::Configuration(format!("invalid ZAPTOS_TOKEN: {e}")))?;
        headers.insert("token", token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ZaptosError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let base_url = config.zaptos_url();
        tracing::debug!(base = %base_url, "WhatsApp client initialized");
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> ZaptosResult<Value> {
        send_json(request).await
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> ZaptosResult<Value> {
        tracing::debug!(path, "GET");
        self.execute(self.http.get(self.url(path)).query(query)).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> ZaptosResult<Value> {
        tracing::debug!(path, "POST");
        self.execute(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> ZaptosResult<Value> {
        tracing::debug!(path, "PUT");
        self.execute(self.http.put(self.url(path)).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> ZaptosResult<Value> {
        tracing::debug!(path, "DELETE");
        self.execute(self.http.delete(self.url(path))).await
    }

    pub async fn send(&self, number: &str, message: &OutboundMessage) -> ZaptosResult<Value> {
        tracing::info!(
            to = number,
            endpoint = message.endpoint(),
            "Sending WhatsApp message"
        );
        self.post(message.endpoint(), &message.payload(number)).await
    }

    pub async fn send_text(&self, number: &str, text: &str) -> ZaptosResult<Value> {
        self.send(number, &OutboundMessage::Text { text: text.into() })
            .await
    }

    pub async fn send_image(
        &self,
        number: &str,
        url: &str,
        caption: Option<&str>,
    ) -> ZaptosResult<Value> {
        let message = OutboundMessage::Image {
            url: url.into(),
            caption: caption.map(Into::into),
        };
        self.send(number, &message).await
    }

    pub async fn send_buttons(
        &self,
        number: &str,
        title: &str,
        buttons: Value,
        description: Option<&str>,
    ) -> ZaptosResult<Value> {
        let message = OutboundMessage::Buttons {
            title: title.into(),
            buttons,
            description: description.map(Into::into),
        };
        self.send(number, &message).await
    }

    pub async fn send_list(
        &self,
        number: &str,
        title: &str,
        sections: Value,
        button_text: &str,
        description: Option<&str>,
    ) -> ZaptosResult<Value> {
        let message = OutboundMessage::List {
            title: title.into(),
            sections,
            button_text: button_text.into(),
            description: description.map(Into::into),
        };
        self.send(number, &message).await
    }

    pub async fn send_carousel(&self, number: &str, cards: Value) -> ZaptosResult<Value> {
        self.send(number, &OutboundMessage::Carousel { cards }).await
    }

    pub async fn send_location(
        &self,
        number: &str,
        latitude: &str,
        longitude: &str,
        address: Option<&str>,
        name: Option<&str>,
    ) -> ZaptosResult<Value> {
        let message = OutboundMessage::Location {
            latitude: latitude.into(),
            longitude: longitude.into(),
            address: address.map(Into::into),
            name: name.map(Into::into),
        };
        self.send(number, &message).await
    }

    pub async fn send_contact(
        &self,
        number: &str,
        contact_name: &str,
        contact_number: &str,
    ) -> ZaptosResult<Value> {
        let message = OutboundMessage::Contact {
            name: contact_name.into(),
            contact_number: contact_number.into(),
        };
        self.send(number, &message).await
    }

    pub async fn send_document(
        &self,
        number: &str,
        url: &str,
        filename: Option<&str>,
        caption: Option<&str>,
    ) -> ZaptosResult<Value> {
        let message = OutboundMessage::Document {
            url: url.into(),
            filename: filename.map(Into::into),
            caption: caption.map(Into::into),
        };
        self.send(number, &message).await
    }

    pub async fn send_audio(&self, number: &str, url: &str) -> ZaptosResult<Value> {
        self.send(number, &OutboundMessage::Audio { url: url.into() })
            .await
    }

    pub async fn send_video(
        &self,
        number: &str,
        url: &str,
        caption: Option<&str>,
    ) -> ZaptosResult<Value> {
        let message = OutboundMessage::Video {
            url: url.into(),
            caption: caption.map(Into::into),
        };
        self.send(number, &message).await
    }

    pub async fn send_sticker(&self, number: &str, url: &str) -> ZaptosResult<Value> {
        self.send(number, &OutboundMessage::Sticker { url: url.into() })
            .await
    }
}

#[async_trait]
impl MessageTransport for WhatsAppClient {
    async fn send_text(&self, number: &str, text: &str) -> ZaptosResult<Value> {
        WhatsAppClient::send_text(self, number, text).await
    }
}
