//! Helpers shared by tools that call third-party HTTP APIs.

use reqwest::Response;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::error::ToolError;

/// Longest upstream error body echoed back to the caller.
const MAX_ERROR_CHARS: usize = 300;

/// Build a URL from a base and path segments. Segments are percent-encoded,
/// so IDs and sheet ranges can be passed through as-is.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ToolError> {
    let mut url = Url::parse(base)
        .map_err(|e| ToolError::ExecutionFailed(format!("Invalid base URL '{}': {}", base, e)))?;

    url.path_segments_mut()
        .map_err(|_| ToolError::ExecutionFailed(format!("Base URL cannot have a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Pass a successful response through; turn anything else into an error that
/// carries the upstream's own message when it sent one.
pub async fn ensure_success(response: Response, service: &str) -> Result<Response, ToolError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    warn!("{} returned status {}: {}", service, status, message);

    Err(ToolError::ExecutionFailed(format!(
        "{} returned status {}: {}",
        service,
        status.as_u16(),
        message
    )))
}

/// Pull a human-readable message out of an upstream error body.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let candidates = [
            json.pointer("/error/message"),
            json.pointer("/error_description"),
            json.pointer("/message"),
            json.pointer("/error"),
        ];
        if let Some(msg) = candidates.into_iter().flatten().find_map(Value::as_str) {
            return msg.to_string();
        }
    }

    body.trim().chars().take(MAX_ERROR_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint("https://sheets.example.com", &["v4", "values", "Sheet 1!A1:B2"]).unwrap();
        assert_eq!(url.as_str(), "https://sheets.example.com/v4/values/Sheet%201!A1:B2");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = endpoint("https://graph.example.com/v19.0/", &["123", "messages"]).unwrap();
        assert_eq!(url.as_str(), "https://graph.example.com/v19.0/123/messages");
    }

    #[test]
    fn test_error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"error":{"message":"bad key"}}"#), "bad key");
        assert_eq!(error_message(r#"{"message":"nope","code":21211}"#), "nope");
        assert_eq!(error_message(r#"{"error":"invalid_grant"}"#), "invalid_grant");
        assert_eq!(error_message("  plain failure "), "plain failure");
    }
}
