//! Shared dependencies handed to every tool.

use std::sync::Arc;
use std::time::Duration;

use database::Database;

use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::media::MediaHost;
use crate::tokens::TokenProvider;

/// Process-wide singletons: one HTTP connection pool, one database pool, the
/// configuration and the OAuth token cache. Cheap to clone.
#[derive(Clone)]
pub struct ToolContext {
    pub http: reqwest::Client,
    pub db: Database,
    pub config: Arc<ToolConfig>,
    pub tokens: Arc<TokenProvider>,
    pub media: Arc<MediaHost>,
}

impl ToolContext {
    /// Build the context, creating the shared HTTP client.
    pub fn new(config: ToolConfig, db: Database) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("toolbox/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let config = Arc::new(config);
        let tokens = Arc::new(TokenProvider::new(http.clone(), db.clone(), config.clone()));
        let media = Arc::new(MediaHost::new(http.clone(), config.clone()));

        Ok(Self {
            http,
            db,
            config,
            tokens,
            media,
        })
    }
}
