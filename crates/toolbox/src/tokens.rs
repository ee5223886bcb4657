//! OAuth access tokens with an in-memory cache in front of the database.

use std::collections::HashMap;
use std::sync::Arc;

use database::{oauth_token, Database};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{required, ToolConfig};
use crate::error::ToolError;
use crate::upstream::{endpoint, ensure_success};

/// Provider name for Google APIs (Gmail, Docs, Sheets).
pub const GOOGLE: &str = "google";

/// Tokens closer than this to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: i64 = 3600;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

impl CachedToken {
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_SKEW_SECS > now
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Hands out access tokens, refreshing them when needed.
///
/// Lookup order is memory, then the `oauth_tokens` table, then a refresh
/// against the provider. Concurrent refreshes are not coordinated; the last
/// one written wins.
pub struct TokenProvider {
    http: reqwest::Client,
    db: Database,
    config: Arc<ToolConfig>,
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, db: Database, config: Arc<ToolConfig>) -> Self {
        Self {
            http,
            db,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Access token for Google APIs.
    pub async fn google_access_token(&self) -> Result<String, ToolError> {
        self.access_token(GOOGLE).await
    }

    /// Access token for a provider.
    pub async fn access_token(&self, provider: &str) -> Result<String, ToolError> {
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = self.cache.lock().await.get(provider) {
            if token.is_fresh(now) {
                return Ok(token.access_token.clone());
            }
        }

        if let Some(stored) = oauth_token::get_token(self.db.pool(), provider).await? {
            let token = CachedToken {
                access_token: stored.access_token,
                expires_at: stored.expires_at,
            };
            if token.is_fresh(now) {
                debug!("Loaded {} token from database", provider);
                self.remember(provider, token.clone()).await;
                return Ok(token.access_token);
            }
        }

        let token = self.refresh(provider, now).await?;
        oauth_token::upsert_token(self.db.pool(), provider, &token.access_token, token.expires_at)
            .await?;
        self.remember(provider, token.clone()).await;

        Ok(token.access_token)
    }

    /// Drop any cached token for a provider (memory only).
    pub async fn invalidate(&self, provider: &str) {
        self.cache.lock().await.remove(provider);
    }

    async fn remember(&self, provider: &str, token: CachedToken) {
        self.cache.lock().await.insert(provider.to_string(), token);
    }

    async fn refresh(&self, provider: &str, now: i64) -> Result<CachedToken, ToolError> {
        if provider != GOOGLE {
            return Err(ToolError::ExecutionFailed(format!(
                "Unknown token provider: {}",
                provider
            )));
        }

        let config = &self.config;
        let client_id = required(&config.google_client_id, "GOOGLE_CLIENT_ID")?;
        let client_secret = required(&config.google_client_secret, "GOOGLE_CLIENT_SECRET")?;
        let refresh_token = required(&config.google_refresh_token, "GOOGLE_REFRESH_TOKEN")?;

        info!("Refreshing {} access token", provider);

        let response = self
            .http
            .post(endpoint(&config.google_oauth_url, &["token"])?)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let data: RefreshResponse = ensure_success(response, "Google OAuth").await?.json().await?;

        Ok(CachedToken {
            access_token: data.access_token,
            expires_at: now + data.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider(server: &MockServer) -> TokenProvider {
        let config = ToolConfig {
            google_oauth_url: server.uri(),
            google_client_id: Some("client".to_string()),
            google_client_secret: Some("secret".to_string()),
            google_refresh_token: Some("refresh".to_string()),
            ..Default::default()
        };
        let db = Database::in_memory().await.unwrap();
        TokenProvider::new(reqwest::Client::new(), db, Arc::new(config))
    }

    #[tokio::test]
    async fn test_refreshes_once_then_serves_from_memory() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "ya29.first", "expires_in": 3599})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tokens = provider(&server).await;
        assert_eq!(tokens.google_access_token().await.unwrap(), "ya29.first");
        assert_eq!(tokens.google_access_token().await.unwrap(), "ya29.first");
    }

    #[tokio::test]
    async fn test_uses_database_token_after_memory_is_cleared() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "ya29.db"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tokens = provider(&server).await;
        tokens.google_access_token().await.unwrap();
        tokens.invalidate(GOOGLE).await;

        assert_eq!(tokens.google_access_token().await.unwrap(), "ya29.db");
    }

    #[tokio::test]
    async fn test_expired_database_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "ya29.new", "expires_in": 3600})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tokens = provider(&server).await;
        oauth_token::upsert_token(tokens.db.pool(), GOOGLE, "ya29.old", 10)
            .await
            .unwrap();

        assert_eq!(tokens.google_access_token().await.unwrap(), "ya29.new");
    }

    #[tokio::test]
    async fn test_refresh_failure_surfaces_upstream_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
            .mount(&server)
            .await;

        let err = provider(&server).await.google_access_token().await.unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let db = Database::in_memory().await.unwrap();
        let tokens = TokenProvider::new(reqwest::Client::new(), db, Arc::new(ToolConfig::default()));

        let err = tokens.google_access_token().await.unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured("GOOGLE_CLIENT_ID")));
    }
}
