//! GoHighLevel REST client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use zaptos_core::http::send_json;
use zaptos_core::{AppConfig, ZaptosError, ZaptosResult};

use crate::adapters::{CrmAdapter, GhlAdapter};
use crate::types::CrmContact;

/// Page size used for tag lookups that feed a campaign.
pub const TAG_LOOKUP_LIMIT: u32 = 100;

/// Tag-filtered contact lookup, the only CRM operation campaigns need.
#[async_trait]
pub trait ContactSource: Send + Sync {
    async fn contacts_by_tag(&self, tag: &str) -> ZaptosResult<Vec<CrmContact>>;
}

pub struct GhlClient {
    http: reqwest::Client,
    base_url: String,
    location_id: Option<String>,
    adapter: GhlAdapter,
}

impl GhlClient {
    pub fn new(config: &AppConfig) -> ZaptosResult<Self> {
        config.require_ghl()?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.ghl_api_key))
            .map_err(|e| ZaptosError::Configuration(format!("invalid GHL_API_KEY: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ZaptosError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let location_id = Some(config.ghl_location_id.trim())
            .filter(|l| !l.is_empty())
            .map(String::from);

        Ok(Self {
            http,
            base_url: config.ghl_base_url.trim_end_matches('/').to_string(),
            location_id,
            adapter: GhlAdapter,
        })
    }

    pub fn location_id(&self) -> Option<&str> {
        self.location_id.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> ZaptosResult<Value> {
        send_json(request).await
    }

    /// `GET /contacts`, optionally narrowed by a search query.
    pub async fn get_contacts(
        &self,
        query: Option<&str>,
        limit: u32,
    ) -> ZaptosResult<Vec<CrmContact>> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(query) = query {
            params.push(("query", query.to_string()));
        }
        if let Some(location_id) = &self.location_id {
            params.push(("locationId", location_id.clone()));
        }

        let response = self
            .execute(self.http.get(self.url("/contacts")).query(&params))
            .await?;

        let raw = response
            .get("contacts")
            .and_then(|c| c.as_array())
            .cloned()
            .unwrap_or_default();

        let mut contacts = Vec::with_capacity(raw.len());
        for item in &raw {
            match self.adapter.transform_inbound(item) {
                Ok(contact) => contacts.push(contact),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed CRM contact"),
            }
        }
        tracing::debug!(count = contacts.len(), "Fetched CRM contacts");
        Ok(contacts)
    }

    pub async fn create_contact(&self, contact: &CrmContact) -> ZaptosResult<Value> {
        let mut body = self.adapter.transform_outbound(contact);
        if let (Some(location_id), Some(obj)) = (&self.location_id, body.as_object_mut()) {
            obj.insert("locationId".to_string(), Value::String(location_id.clone()));
        }
        self.execute(self.http.post(self.url("/contacts")).json(&body))
            .await
    }

    pub async fn update_contact(&self, contact_id: &str, contact: &CrmContact) -> ZaptosResult<Value> {
        let body = self.adapter.transform_outbound(contact);
        self.execute(
            self.http
                .put(self.url(&format!("/contacts/{contact_id}")))
                .json(&body),
        )
        .await
    }
}

#[async_trait]
impl ContactSource for GhlClient {
    async fn contacts_by_tag(&self, tag: &str) -> ZaptosResult<Vec<CrmContact>> {
        let contacts = self.get_contacts(Some(tag), TAG_LOOKUP_LIMIT).await?;
        Ok(contacts.into_iter().filter(|c| c.has_tag(tag)).collect())
    }
}
