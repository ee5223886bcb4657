//! Authorized JSON calls to Google REST APIs.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tokens::TokenProvider;
use crate::upstream::ensure_success;

/// Thin client that attaches a Google access token to each request.
pub struct GoogleApi {
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
    service: &'static str,
}

impl GoogleApi {
    pub fn new(ctx: &ToolContext, service: &'static str) -> Self {
        Self {
            http: ctx.http.clone(),
            tokens: ctx.tokens.clone(),
            service,
        }
    }

    /// Fail early when no token can be obtained.
    pub async fn ensure_token(&self) -> Result<(), ToolError> {
        self.tokens.google_access_token().await.map(|_| ())
    }

    pub async fn get(&self, url: Url) -> Result<Value, ToolError> {
        self.send(self.http.get(url)).await
    }

    pub async fn post(&self, url: Url, body: &Value) -> Result<Value, ToolError> {
        self.send(self.http.post(url).json(body)).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ToolError> {
        let token = self.tokens.google_access_token().await?;
        debug!("Calling {}", self.service);

        let response = request.bearer_auth(token).send().await?;
        Ok(ensure_success(response, self.service).await?.json().await?)
    }
}
