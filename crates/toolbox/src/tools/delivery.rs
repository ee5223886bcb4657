//! Per-recipient fan-out shared by the messaging tools.

use std::future::Future;

use serde_json::{json, Value};
use tracing::warn;

use crate::error::ToolError;
use crate::tool::ToolOutput;

/// Send to each recipient in turn. One recipient failing does not stop the
/// rest; the envelope `status` is true only if every send succeeded.
pub async fn deliver_each<F, Fut>(recipients: Vec<String>, mut send: F) -> ToolOutput
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, ToolError>>,
{
    let mut results = Vec::with_capacity(recipients.len());
    let mut all_ok = true;

    for to in recipients {
        match send(to.clone()).await {
            Ok(id) => results.push(json!({ "to": to, "status": true, "id": id })),
            Err(e) => {
                warn!("Delivery to {} failed: {}", to, e);
                all_ok = false;
                results.push(json!({ "to": to, "status": false, "message": e.to_string() }));
            }
        }
    }

    let content = json!({ "status": all_ok, "results": results });
    if all_ok {
        ToolOutput::success(content)
    } else {
        ToolOutput::failure(content)
    }
}

/// Example `results` entry for tool descriptors.
pub fn demo_results(to: &str, id: &str) -> Value {
    json!({ "status": true, "results": [{ "to": to, "status": true, "id": id }] })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_all_succeed() {
        let output = deliver_each(vec!["a".to_string(), "b".to_string()], |to| async move {
            Ok(format!("id-{}", to))
        })
        .await;

        assert!(output.success);
        assert_eq!(output.content["results"][1], json!({"to": "b", "status": true, "id": "id-b"}));
    }

    #[tokio::test]
    async fn test_one_failure_marks_envelope() {
        let output = deliver_each(vec!["ok".to_string(), "bad".to_string(), "ok2".to_string()], |to| async move {
            if to == "bad" {
                Err(ToolError::ExecutionFailed("rejected".to_string()))
            } else {
                Ok("sent".to_string())
            }
        })
        .await;

        assert!(!output.success);
        assert_eq!(output.content["status"], false);
        let results = output.content["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1]["status"], false);
        assert_eq!(results[1]["message"], "Execution failed: rejected");
        assert_eq!(results[2]["status"], true);
    }
}
