use serde::{Deserialize, Serialize};
use zaptos_core::Recipient;

/// A CRM contact normalized to one stable shape, whatever field names the
/// provider used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `None` when the provider did not report tags at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl CrmContact {
    /// Contacts without a tag list are assumed to match; the provider already
    /// filtered them server-side.
    pub fn has_tag(&self, tag: &str) -> bool {
        match &self.tags {
            Some(tags) => tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag.trim())),
            None => true,
        }
    }

    /// `None` when the contact has no usable phone number.
    pub fn to_recipient(&self) -> Option<Recipient> {
        let phone = self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())?;
        Some(Recipient::new(phone, self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_recipient_requires_phone() {
        let contact = CrmContact {
            phone: Some("  ".into()),
            name: Some("Ana".into()),
            ..Default::default()
        };
        assert!(contact.to_recipient().is_none());

        let contact = CrmContact {
            phone: Some("+5511999990000".into()),
            name: Some("Ana".into()),
            ..Default::default()
        };
        assert_eq!(
            contact.to_recipient(),
            Some(Recipient::new("+5511999990000", Some("Ana".into())))
        );
    }

    #[test]
    fn test_has_tag() {
        let untagged = CrmContact::default();
        assert!(untagged.has_tag("vip"));

        let tagged = CrmContact {
            tags: Some(vec!["VIP".into(), "lead".into()]),
            ..Default::default()
        };
        assert!(tagged.has_tag("vip"));
        assert!(!tagged.has_tag("churned"));
    }
}
