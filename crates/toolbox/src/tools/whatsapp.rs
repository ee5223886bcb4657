//! WhatsApp text messages through the Cloud API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{required, ToolConfig};
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::tools::delivery::{deliver_each, demo_results};
use crate::upstream::{endpoint, ensure_success};

pub struct SendWhatsapp {
    http: reqwest::Client,
    config: Arc<ToolConfig>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

impl SendWhatsapp {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            http: ctx.http.clone(),
            config: ctx.config.clone(),
        }
    }

    async fn send(&self, to: &str, message: &str) -> Result<String, ToolError> {
        let phone_number_id = required(&self.config.whatsapp_phone_number_id, "WHATSAPP_PHONE_NUMBER_ID")?;
        let access_token = required(&self.config.whatsapp_access_token, "WHATSAPP_ACCESS_TOKEN")?;
        let url = endpoint(&self.config.whatsapp_url, &[phone_number_id, "messages"])?;

        // The Cloud API wants bare digits with the country code.
        let recipient: String = to.chars().filter(char::is_ascii_digit).collect();
        if recipient.is_empty() {
            return Err(ToolError::invalid("to", format!("'{}' is not a phone number", to)));
        }

        debug!("Sending WhatsApp message to {}", recipient);

        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": recipient,
                "type": "text",
                "text": { "preview_url": false, "body": message },
            }))
            .send()
            .await?;

        let body: SendResponse = ensure_success(response, "WhatsApp").await?.json().await?;
        body.messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .ok_or_else(|| ToolError::ExecutionFailed("WhatsApp returned no message id".to_string()))
    }
}

#[async_trait]
impl Tool for SendWhatsapp {
    fn name(&self) -> &str {
        "sendWhatsapp"
    }

    fn description(&self) -> &str {
        "Sends a WhatsApp text message to one or more phone numbers (international format). \
         Reports delivery status per recipient."
    }

    fn required_params(&self) -> &[&str] {
        &["to", "message"]
    }

    fn demo_body(&self) -> Value {
        json!({ "to": ["+15551234567"], "message": "Your order has shipped." })
    }

    fn demo_response(&self) -> Value {
        demo_results("+15551234567", "wamid.HBgLMTU1NTEyMzQ1NjcVAgARGBI")
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let recipients = args.get_string_list("to")?;
        let message = args.get_string("message")?;

        // Fail fast on configuration rather than once per recipient.
        required(&self.config.whatsapp_phone_number_id, "WHATSAPP_PHONE_NUMBER_ID")?;
        required(&self.config.whatsapp_access_token, "WHATSAPP_ACCESS_TOKEN")?;

        Ok(deliver_each(recipients, |to| {
            let message = message.clone();
            async move { self.send(&to, &message).await }
        })
        .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::Database;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn tool(server: &MockServer) -> SendWhatsapp {
        let config = ToolConfig {
            whatsapp_url: format!("{}/v19.0", server.uri()),
            whatsapp_phone_number_id: Some("10001".to_string()),
            whatsapp_access_token: Some("wa-token".to_string()),
            ..Default::default()
        };
        SendWhatsapp::new(&ToolContext::new(config, Database::in_memory().await.unwrap()).unwrap())
    }

    fn args(value: Value) -> ToolArgs {
        ToolArgs::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_send_to_each_recipient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v19.0/10001/messages"))
            .and(header("Authorization", "Bearer wa-token"))
            .and(body_partial_json(json!({"to": "15551230001", "text": {"body": "hi"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": [{"id": "wamid.1"}]})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v19.0/10001/messages"))
            .and(body_partial_json(json!({"to": "15551230002"})))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"message": "Recipient phone number not in allowed list"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let output = tool(&server)
            .await
            .execute(args(json!({"to": ["+1 555 123 0001", "+1-555-123-0002"], "message": "hi"})))
            .await
            .unwrap();

        assert!(!output.success);
        let results = output.content["results"].as_array().unwrap();
        assert_eq!(results[0]["id"], "wamid.1");
        assert_eq!(results[0]["to"], "+1 555 123 0001");
        assert_eq!(results[1]["status"], false);
        assert!(results[1]["message"]
            .as_str()
            .unwrap()
            .contains("not in allowed list"));
    }

    #[tokio::test]
    async fn test_single_recipient_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": [{"id": "wamid.9"}]})))
            .mount(&server)
            .await;

        let output = tool(&server)
            .await
            .execute(args(json!({"to": "+15551230009", "message": "hello"})))
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.content["status"], true);
    }

    #[tokio::test]
    async fn test_not_configured() {
        let tool = SendWhatsapp::new(
            &ToolContext::new(ToolConfig::default(), Database::in_memory().await.unwrap()).unwrap(),
        );
        let err = tool
            .execute(args(json!({"to": "+15551230009", "message": "hello"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured("WHATSAPP_PHONE_NUMBER_ID")));
    }
}
