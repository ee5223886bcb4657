//! Email through the Gmail API, one message per recipient.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::Message;
use serde_json::{json, Value};

use crate::config::{required, ToolConfig};
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::tools::delivery::{deliver_each, demo_results};
use crate::tools::google::GoogleApi;
use crate::upstream::endpoint;

pub struct SendEmail {
    api: GoogleApi,
    config: Arc<ToolConfig>,
}

impl SendEmail {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            api: GoogleApi::new(ctx, "Gmail"),
            config: ctx.config.clone(),
        }
    }

    async fn send(&self, raw: String) -> Result<String, ToolError> {
        let url = endpoint(
            &self.config.gmail_url,
            &["gmail", "v1", "users", "me", "messages", "send"],
        )?;
        let sent = self.api.post(url, &json!({ "raw": raw })).await?;

        sent.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ToolError::ExecutionFailed("Gmail returned no message id".to_string()))
    }
}

/// Compose one message with lettre and encode it the way `messages.send`
/// expects (base64url, no padding).
fn raw_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    body: &str,
    html: bool,
) -> Result<String, ToolError> {
    let to: Mailbox = to
        .parse()
        .map_err(|e| ToolError::invalid("to", format!("'{}': {}", to, e)))?;
    let content_type = if html {
        ContentType::TEXT_HTML
    } else {
        ContentType::TEXT_PLAIN
    };

    let message = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .header(content_type)
        .body(body.to_string())
        .map_err(|e| ToolError::ExecutionFailed(format!("Could not build email: {}", e)))?;

    Ok(URL_SAFE_NO_PAD.encode(message.formatted()))
}

#[async_trait]
impl Tool for SendEmail {
    fn name(&self) -> &str {
        "sendEmail"
    }

    fn description(&self) -> &str {
        "Sends an email from the connected Gmail account to one or more recipients. \
         Set html to true to send the body as HTML."
    }

    fn required_params(&self) -> &[&str] {
        &["to", "subject", "body"]
    }

    fn demo_body(&self) -> Value {
        json!({
            "to": ["jane@example.com"],
            "subject": "Weekly report",
            "body": "The report is attached.",
            "html": false
        })
    }

    fn demo_response(&self) -> Value {
        demo_results("jane@example.com", "18c2f1a9b0e4d7c3")
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let recipients = args.get_string_list("to")?;
        let subject = args.get_string("subject")?;
        let body = args.get_string("body")?;
        let html = args.get_bool_or("html", false);

        if subject.contains(['\r', '\n']) {
            return Err(ToolError::invalid("subject", "cannot contain line breaks"));
        }
        let sender = required(&self.config.gmail_sender, "GMAIL_SENDER")?;
        let from: Mailbox = sender
            .parse()
            .map_err(|e| ToolError::ExecutionFailed(format!("GMAIL_SENDER is not a valid address: {}", e)))?;
        self.api.ensure_token().await?;

        Ok(deliver_each(recipients, |to| {
            let raw = raw_message(&from, &to, &subject, &body, html);
            async move { self.send(raw?).await }
        })
        .await)
    }
}
