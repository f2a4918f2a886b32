//! Response handling shared by the messaging and CRM clients.

use serde_json::Value;

use crate::error::{ZaptosError, ZaptosResult};

/// Send a prepared request and decode its JSON body.
pub async fn send_json(request: reqwest::RequestBuilder) -> ZaptosResult<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| ZaptosError::transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| ZaptosError::transport(e.to_string()))?;
    decode_body(status, body)
}

/// Non-2xx becomes a transport error carrying the status and raw body; an
/// empty 2xx body is `null`.
pub fn decode_body(status: u16, body: String) -> ZaptosResult<Value> {
    if !(200..300).contains(&status) {
        return Err(ZaptosError::Transport {
            status: Some(status),
            body,
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|e| ZaptosError::transport(format!("invalid JSON in response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_status_keeps_raw_body() {
        let err = decode_body(404, "no such instance".into()).unwrap_err();
        assert_eq!(err.kind(), "transport_error");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Transport error: HTTP 404: no such instance");
    }

    #[test]
    fn test_blank_success_is_null() {
        assert_eq!(decode_body(204, String::new()).unwrap(), Value::Null);
        assert_eq!(decode_body(200, "  \n".into()).unwrap(), Value::Null);
    }

    #[test]
    fn test_success_body_is_decoded() {
        assert_eq!(decode_body(201, r#"{"id":"c1"}"#.into()).unwrap(), json!({"id": "c1"}));
    }

    #[test]
    fn test_garbage_success_body_has_no_status() {
        let err = decode_body(200, "<html>".into()).unwrap_err();
        assert_eq!(err.kind(), "transport_error");
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("invalid JSON"));
    }
}
