//! Rendering of command results and errors on stdout.

use serde_json::{json, Value};
use zaptos_core::{ZaptosError, ZaptosResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn parse(s: &str) -> ZaptosResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(ZaptosError::Configuration(format!(
                "unknown output format '{other}', expected json or yaml"
            ))),
        }
    }

    pub fn render(&self, value: &Value) -> ZaptosResult<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => serde_yaml::to_string(value)
                .map(|s| s.trim_end().to_string())
                .map_err(|e| ZaptosError::Validation(format!("cannot render YAML: {e}"))),
        }
    }
}

/// `{"error": {"kind", "message", "status"?}}`
pub fn error_document(err: &anyhow::Error) -> Value {
    let (kind, status) = match err.downcast_ref::<ZaptosError>() {
        Some(e) => (e.kind(), e.status()),
        None => ("error", None),
    };
    let mut body = json!({
        "kind": kind,
        "message": err.to_string(),
    });
    if let Some(status) = status {
        body["status"] = json!(status);
    }
    json!({ "error": body })
}
