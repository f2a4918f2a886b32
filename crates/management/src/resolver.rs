//! Recipient resolution from a campaign's source descriptor.
//!
//! Provider-specific field names stop here: callers only ever see
//! [`Recipient`].

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};
use zaptos_cdp::ContactSource;
use zaptos_core::{CampaignSource, Recipient, ZaptosError, ZaptosResult};

pub struct RecipientResolver {
    crm: Option<Arc<dyn ContactSource>>,
}

impl RecipientResolver {
    /// `crm` is `None` when no CRM credential is configured.
    pub fn new(crm: Option<Arc<dyn ContactSource>>) -> Self {
        Self { crm }
    }

    pub fn csv_only() -> Self {
        Self { crm: None }
    }

    /// Ordered recipients for one run. Entries without a usable number are
    /// dropped, so the result length is the campaign's `total`.
    pub async fn resolve(
        &self,
        source: CampaignSource,
        source_config: &str,
    ) -> ZaptosResult<Vec<Recipient>> {
        match source {
            CampaignSource::Csv => read_csv(Path::new(source_config)),
            CampaignSource::Crm => self.resolve_crm(source_config).await,
        }
    }

    async fn resolve_crm(&self, tag: &str) -> ZaptosResult<Vec<Recipient>> {
        let crm = self.crm.as_ref().ok_or_else(|| {
            ZaptosError::Resolution(
                "CRM client not configured: GHL_API_KEY must be set or provided".into(),
            )
        })?;
        if tag.trim().is_empty() {
            return Err(ZaptosError::Resolution("CRM tag is empty".into()));
        }

        let contacts = crm
            .contacts_by_tag(tag)
            .await
            .map_err(|e| ZaptosError::Resolution(format!("CRM lookup for tag '{tag}' failed: {e}")))?;

        let fetched = contacts.len();
        let recipients: Vec<Recipient> = contacts.iter().filter_map(|c| c.to_recipient()).collect();
        if recipients.len() < fetched {
            debug!(
                tag,
                dropped = fetched - recipients.len(),
                "CRM contacts without phone skipped"
            );
        }
        Ok(recipients)
    }
}

/// Read recipients from a CSV file with a header row.
pub fn read_csv(path: &Path) -> ZaptosResult<Vec<Recipient>> {
    let file = std::fs::File::open(path).map_err(|e| {
        ZaptosError::Resolution(format!("cannot open contacts file {}: {e}", path.display()))
    })?;
    parse_csv(file).map_err(|e| match e {
        ZaptosError::Resolution(msg) => {
            ZaptosError::Resolution(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Columns: `number` (or `phone`) and optional `name` (or `firstName`).
/// Rows with neither number column filled are skipped.
pub fn parse_csv<R: Read>(reader: R) -> ZaptosResult<Vec<Recipient>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ZaptosError::Resolution(format!("invalid CSV header: {e}")))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let number_cols: Vec<usize> = [column("number"), column("phone")].into_iter().flatten().collect();
    let name_cols: Vec<usize> = [column("name"), column("firstName")].into_iter().flatten().collect();

    if number_cols.is_empty() {
        warn!("CSV has no 'number' or 'phone' column, no recipients");
    }

    let first_filled = |record: &csv::StringRecord, cols: &[usize]| {
        cols.iter()
            .filter_map(|&i| record.get(i))
            .find(|v| !v.is_empty())
            .map(String::from)
    };

    let mut recipients = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record
            .map_err(|e| ZaptosError::Resolution(format!("invalid CSV row {}: {e}", line + 2)))?;
        let Some(number) = first_filled(&record, &number_cols) else {
            debug!(row = line + 2, "CSV row without number skipped");
            continue;
        };
        recipients.push(Recipient::new(number, first_filled(&record, &name_cols)));
    }
    Ok(recipients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use zaptos_cdp::CrmContact;

    struct FixedContacts(Vec<CrmContact>);

    #[async_trait]
    impl ContactSource for FixedContacts {
        async fn contacts_by_tag(&self, _tag: &str) -> ZaptosResult<Vec<CrmContact>> {
            Ok(self.0.clone())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl ContactSource for Unreachable {
        async fn contacts_by_tag(&self, _tag: &str) -> ZaptosResult<Vec<CrmContact>> {
            Err(ZaptosError::transport("connection refused"))
        }
    }

    #[test]
    fn test_parse_number_and_name_columns() {
        let csv = "number,name,city\n5511,Ana,SP\n5522,,RJ\n";
        let recipients = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(
            recipients,
            vec![
                Recipient::new("5511", Some("Ana".into())),
                Recipient::new("5522", None),
            ]
        );
    }

    #[test]
    fn test_parse_phone_and_first_name_fallbacks() {
        let csv = "phone,firstName\n 5511 , Ana \n";
        let recipients = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(recipients, vec![Recipient::new("5511", Some("Ana".into()))]);

        let both = "number,phone,name\n,5533,Bo\n";
        assert_eq!(parse_csv(both.as_bytes()).unwrap()[0].number, "5533");
    }

    #[test]
    fn test_rows_without_number_are_skipped() {
        let csv = "number,name\n5511,Ana\n,Bo\n5533\n";
        let recipients = parse_csv(csv.as_bytes()).unwrap();
        let numbers: Vec<_> = recipients.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(numbers, vec!["5511", "5533"]);
    }

    #[test]
    fn test_missing_file_is_resolution_error() {
        let err = read_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.kind(), "resolution_error");
    }

    #[tokio::test]
    async fn test_crm_source_normalizes_contacts() {
        let resolver = RecipientResolver::new(Some(Arc::new(FixedContacts(vec![
            CrmContact {
                phone: Some("5511".into()),
                name: Some("Ana Souza".into()),
                ..Default::default()
            },
            CrmContact {
                name: Some("No Phone".into()),
                ..Default::default()
            },
        ]))));

        let recipients = resolver.resolve(CampaignSource::Crm, "vip").await.unwrap();
        assert_eq!(recipients, vec![Recipient::new("5511", Some("Ana Souza".into()))]);
    }

    #[tokio::test]
    async fn test_crm_without_client_fails() {
        let err = RecipientResolver::csv_only()
            .resolve(CampaignSource::Crm, "vip")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "resolution_error");
    }

    #[tokio::test]
    async fn test_unreachable_crm_is_resolution_error() {
        let resolver = RecipientResolver::new(Some(Arc::new(Unreachable)));
        let err = resolver.resolve(CampaignSource::Crm, "vip").await.unwrap_err();
        assert_eq!(err.kind(), "resolution_error");
        assert!(err.to_string().contains("connection refused"));
    }
}
