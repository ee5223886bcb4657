//! Google Docs: create a document, read one back as plain text.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::config::ToolConfig;
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::tools::google::GoogleApi;
use crate::upstream::endpoint;

fn document_url(id: &str) -> String {
    format!("https://docs.google.com/document/d/{}/edit", id)
}

/// Concatenate every text run in the document body.
fn plain_text(document: &Value) -> String {
    let Some(content) = document.pointer("/body/content").and_then(Value::as_array) else {
        return String::new();
    };

    content
        .iter()
        .filter_map(|block| block.pointer("/paragraph/elements").and_then(Value::as_array))
        .flatten()
        .filter_map(|element| element.pointer("/textRun/content").and_then(Value::as_str))
        .collect()
}

/// `createGoogleDoc`: `{title, content?}`.
pub struct CreateGoogleDoc {
    api: GoogleApi,
    config: Arc<ToolConfig>,
}

impl CreateGoogleDoc {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            api: GoogleApi::new(ctx, "Google Docs"),
            config: ctx.config.clone(),
        }
    }
}

#[async_trait]
impl Tool for CreateGoogleDoc {
    fn name(&self) -> &str {
        "createGoogleDoc"
    }

    fn description(&self) -> &str {
        "Creates a Google Doc with a title and optional initial text."
    }

    fn required_params(&self) -> &[&str] {
        &["title"]
    }

    fn demo_body(&self) -> Value {
        json!({ "title": "Meeting notes", "content": "Agenda:\n1. Budget" })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "documentId": "1AbCdEfGhIjKlMnOpQrStUvWxYz",
            "title": "Meeting notes",
            "url": "https://docs.google.com/document/d/1AbCdEfGhIjKlMnOpQrStUvWxYz/edit"
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let title = args.get_string("title")?;
        let content = args.get_string_opt("content");

        let url = endpoint(&self.config.google_docs_url, &["v1", "documents"])?;
        let created = self.api.post(url, &json!({ "title": title })).await?;
        let id = created
            .get("documentId")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::ExecutionFailed("Google Docs returned no document id".to_string()))?
            .to_string();

        if let Some(text) = content {
            let url = endpoint(
                &self.config.google_docs_url,
                &["v1", "documents", format!("{}:batchUpdate", id).as_str()],
            )?;
            let update = json!({
                "requests": [{
                    "insertText": { "location": { "index": 1 }, "text": text }
                }]
            });
            self.api.post(url, &update).await?;
        }

        info!("Created Google Doc {}", id);

        Ok(ToolOutput::success(json!({
            "status": true,
            "documentId": id,
            "title": title,
            "url": document_url(&id),
        })))
    }
}

/// `readGoogleDoc`: `{documentId}`.
pub struct ReadGoogleDoc {
    api: GoogleApi,
    config: Arc<ToolConfig>,
}

impl ReadGoogleDoc {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            api: GoogleApi::new(ctx, "Google Docs"),
            config: ctx.config.clone(),
        }
    }
}

#[async_trait]
impl Tool for ReadGoogleDoc {
    fn name(&self) -> &str {
        "readGoogleDoc"
    }

    fn description(&self) -> &str {
        "Reads a Google Doc and returns its title and plain text."
    }

    fn required_params(&self) -> &[&str] {
        &["documentId"]
    }

    fn demo_body(&self) -> Value {
        json!({ "documentId": "1AbCdEfGhIjKlMnOpQrStUvWxYz" })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "documentId": "1AbCdEfGhIjKlMnOpQrStUvWxYz",
            "title": "Meeting notes",
            "content": "Agenda:\n1. Budget\n"
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let id = args.get_string("documentId")?;
        let url = endpoint(&self.config.google_docs_url, &["v1", "documents", id.as_str()])?;
        let document = self.api.get(url).await?;

        Ok(ToolOutput::success(json!({
            "status": true,
            "documentId": id,
            "title": document.get("title").and_then(Value::as_str).unwrap_or_default(),
            "content": plain_text(&document),
        })))
    }
}
