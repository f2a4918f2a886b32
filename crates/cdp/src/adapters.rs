use serde_json::{Map, Value};
use zaptos_core::{ZaptosError, ZaptosResult};

use crate::types::CrmContact;

/// Transforms contact payloads between the CRM's wire format and
/// [`CrmContact`].
pub trait CrmAdapter: Send + Sync {
    /// Transform a raw CRM contact into the internal shape.
    fn transform_inbound(&self, raw: &Value) -> ZaptosResult<CrmContact>;

    /// Transform an internal contact into the CRM's create/update body.
    fn transform_outbound(&self, contact: &CrmContact) -> Value;
}

// ---------------------------------------------------------------------------
// GoHighLevel
// ---------------------------------------------------------------------------

/// Contacts arrive either as `{phone, name}` or `{phone, firstName, lastName}`.
pub struct GhlAdapter;

fn text_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl CrmAdapter for GhlAdapter {
    fn transform_inbound(&self, raw: &Value) -> ZaptosResult<CrmContact> {
        if !raw.is_object() {
            return Err(ZaptosError::Validation(format!(
                "expected a contact object, got {raw}"
            )));
        }

        let name = text_field(raw, "name").or_else(|| {
            let first = text_field(raw, "firstName").unwrap_or_default();
            let last = text_field(raw, "lastName").unwrap_or_default();
            let full = format!("{first} {last}").trim().to_string();
            (!full.is_empty()).then_some(full)
        });

        let tags = raw.get("tags").and_then(|v| v.as_array()).map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        });

        Ok(CrmContact {
            id: text_field(raw, "id"),
            phone: text_field(raw, "phone"),
            name,
            email: text_field(raw, "email"),
            tags,
        })
    }

    fn transform_outbound(&self, contact: &CrmContact) -> Value {
        let mut out = Map::new();
        if let Some(name) = &contact.name {
            out.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(phone) = &contact.phone {
            out.insert("phone".to_string(), Value::String(phone.clone()));
        }
        if let Some(email) = &contact.email {
            out.insert("email".to_string(), Value::String(email.clone()));
        }
        if let Some(tags) = &contact.tags {
            out.insert(
                "tags".to_string(),
                Value::Array(tags.iter().map(|t| Value::String(t.clone())).collect()),
            );
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inbound_with_full_name() {
        let contact = GhlAdapter
            .transform_inbound(&json!({"id": "c1", "phone": "+551199", "name": "Ana Souza"}))
            .unwrap();
        assert_eq!(contact.id.as_deref(), Some("c1"));
        assert_eq!(contact.name.as_deref(), Some("Ana Souza"));
        assert_eq!(contact.tags, None);
    }

    #[test]
    fn test_inbound_joins_first_and_last_name() {
        let contact = GhlAdapter
            .transform_inbound(&json!({
                "phone": "+551199",
                "firstName": "Ana",
                "lastName": "Souza",
                "tags": ["vip", 7]
            }))
            .unwrap();
        assert_eq!(contact.name.as_deref(), Some("Ana Souza"));
        assert_eq!(contact.tags, Some(vec!["vip".to_string()]));

        let first_only = GhlAdapter
            .transform_inbound(&json!({"phone": "1", "firstName": "Ana", "name": ""}))
            .unwrap();
        assert_eq!(first_only.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_inbound_without_any_name() {
        let contact = GhlAdapter.transform_inbound(&json!({"phone": "1"})).unwrap();
        assert_eq!(contact.name, None);
    }

    #[test]
    fn test_inbound_rejects_non_objects() {
        assert!(GhlAdapter.transform_inbound(&json!("nope")).is_err());
    }

    #[test]
    fn test_outbound_skips_missing_fields() {
        let contact = CrmContact {
            name: Some("Ana".into()),
            phone: Some("+551199".into()),
            ..Default::default()
        };
        assert_eq!(
            GhlAdapter.transform_outbound(&contact),
            json!({"name": "Ana", "phone": "+551199"})
        );
    }
}
