//! SMS and voice calls through Twilio's REST API.

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

/// Credentials and the account-scoped resource POST shared by both tools.
struct Twilio {
    http: reqwest::Client,
    config: Arc<ToolConfig>,
}

struct Credentials<'a> {
    account_sid: &'a str,
    auth_token: &'a str,
    from: &'a str,
}

#[derive(Debug, Deserialize)]
struct Created {
    sid: String,
}

impl Twilio {
    fn new(ctx: &ToolContext) -> Self {
        Self {
            http: ctx.http.clone(),
            config: ctx.config.clone(),
        }
    }

    fn credentials(&self) -> Result<Credentials<'_>, ToolError> {
        Ok(Credentials {
            account_sid: required(&self.config.twilio_account_sid, "TWILIO_ACCOUNT_SID")?,
            auth_token: required(&self.config.twilio_auth_token, "TWILIO_AUTH_TOKEN")?,
            from: required(&self.config.twilio_from_number, "TWILIO_FROM_NUMBER")?,
        })
    }

    /// POST a form to `/2010-04-01/Accounts/{sid}/{resource}` and return the
    /// SID of the created message or call.
    async fn create(&self, resource: &str, to: &str, fields: &[(&str, &str)]) -> Result<String, ToolError> {
        let creds = self.credentials()?;
        let url = endpoint(
            &self.config.twilio_url,
            &["2010-04-01", "Accounts", creds.account_sid, resource],
        )?;

        let mut form = vec![("To", to), ("From", creds.from)];
        form.extend_from_slice(fields);

        debug!("Twilio {} to {}", resource, to);

        let response = self
            .http
            .post(url)
            .basic_auth(creds.account_sid, Some(creds.auth_token))
            .form(&form)
            .send()
            .await?;

        let created: Created = ensure_success(response, "Twilio").await?.json().await?;
        Ok(created.sid)
    }
}

/// Escape text for inclusion in a TwiML element.
fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn say_twiml(message: &str) -> String {
    format!("<Response><Say>{}</Say></Response>", xml_escape(message))
}

/// `sendSms`: `{to: string | string[], message}`.
pub struct SendSms {
    twilio: Twilio,
}

impl SendSms {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            twilio: Twilio::new(ctx),
        }
    }
}

#[async_trait]
impl Tool for SendSms {
    fn name(&self) -> &str {
        "sendSms"
    }

    fn description(&self) -> &str {
        "Sends an SMS to one or more phone numbers in E.164 format. Reports delivery status per recipient."
    }

    fn required_params(&self) -> &[&str] {
        &["to", "message"]
    }

    fn demo_body(&self) -> Value {
        json!({ "to": ["+15551234567"], "message": "Your code is 123456" })
    }

    fn demo_response(&self) -> Value {
        demo_results("+15551234567", "SM0123456789abcdef0123456789abcdef")
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let recipients = args.get_string_list("to")?;
        let message = args.get_string("message")?;
        self.twilio.credentials()?;

        let twilio = &self.twilio;
        Ok(deliver_each(recipients, |to| {
            let message = message.clone();
            async move { twilio.create("Messages.json", &to, &[("Body", message.as_str())]).await }
        })
        .await)
    }
}

/// `makeCall`: `{to, message}`; the message is read out with TwiML `<Say>`.
pub struct MakeCall {
    twilio: Twilio,
}

impl MakeCall {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            twilio: Twilio::new(ctx),
        }
    }
}

#[async_trait]
impl Tool for MakeCall {
    fn name(&self) -> &str {
        "makeCall"
    }

    fn description(&self) -> &str {
        "Places a phone call that reads a message aloud. Accepts one number or a list."
    }

    fn required_params(&self) -> &[&str] {
        &["to", "message"]
    }

    fn demo_body(&self) -> Value {
        json!({ "to": "+15551234567", "message": "Your appointment is tomorrow at 9 AM." })
    }

    fn demo_response(&self) -> Value {
        demo_results("+15551234567", "CA0123456789abcdef0123456789abcdef")
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let recipients = args.get_string_list("to")?;
        let twiml = say_twiml(&args.get_string("message")?);
        self.twilio.credentials()?;

        let twilio = &self.twilio;
        Ok(deliver_each(recipients, |to| {
            let twiml = twiml.clone();
            async move { twilio.create("Calls.json", &to, &[("Twiml", twiml.as_str())]).await }
        })
        .await)
    }
}
