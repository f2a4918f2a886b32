//! One module per command group. Each exposes a clap `Subcommand` enum and an
//! async `run` that returns the structured result document.

pub mod analytics;
pub mod campaigns;
pub mod contacts;
pub mod conversations;
pub mod flows;
pub mod messages;
pub mod templates;
pub mod webhooks;

use std::path::Path;

use serde_json::Value;
use zaptos_core::{ZaptosError, ZaptosResult};

/// Query parameters with unset options dropped.
pub(crate) fn params<'a>(pairs: &[(&'a str, Option<String>)]) -> Vec<(&'a str, String)> {
    pairs
        .iter()
        .filter_map(|(k, v)| v.clone().map(|v| (*k, v)))
        .collect()
}

fn read_file(path: &Path) -> ZaptosResult<String> {
    if !path.exists() {
        return Err(ZaptosError::Validation(format!(
            "File {} not found",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

pub(crate) fn read_json_file(path: &Path) -> ZaptosResult<Value> {
    let raw = read_file(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        ZaptosError::Validation(format!("invalid JSON in {}: {e}", path.display()))
    })
}

pub(crate) fn read_yaml_file(path: &Path) -> ZaptosResult<Value> {
    let raw = read_file(path)?;
    serde_yaml::from_str(&raw).map_err(|e| {
        ZaptosError::Validation(format!("Error parsing YAML in {}: {e}", path.display()))
    })
}

/// Set `name` on a JSON object document.
pub(crate) fn with_name(mut doc: Value, name: &str, overwrite: bool) -> ZaptosResult<Value> {
    let obj = doc
        .as_object_mut()
        .ok_or_else(|| ZaptosError::Validation("document must be an object".into()))?;
    if overwrite || !obj.contains_key("name") {
        obj.insert("name".into(), Value::String(name.to_string()));
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_drop_unset() {
        let p = params(&[("since", Some("2024-01-01".into())), ("until", None)]);
        assert_eq!(p, vec![("since", "2024-01-01".to_string())]);
    }

    #[test]
    fn test_with_name() {
        let doc = with_name(json!({"name": "old", "body": "x"}), "new", true).unwrap();
        assert_eq!(doc["name"], "new");

        let doc = with_name(json!({"name": "kept"}), "new", false).unwrap();
        assert_eq!(doc["name"], "kept");

        assert!(with_name(json!([1, 2]), "new", true).is_err());
    }

    #[test]
    fn test_read_files() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("t.json");
        std::fs::write(&json_path, r#"{"body": "Hi"}"#).unwrap();
        assert_eq!(read_json_file(&json_path).unwrap()["body"], "Hi");

        let yaml_path = dir.path().join("f.yaml");
        std::fs::write(&yaml_path, "name: welcome\nsteps:\n  - id: start\n").unwrap();
        assert_eq!(read_yaml_file(&yaml_path).unwrap()["steps"][0]["id"], "start");

        let err = read_json_file(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }
}
