//! `verifyToken`: check an HS256 token against the configured secret.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::auth::{verify_token, TokenStatus};
use crate::config::{required, ToolConfig};
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

pub struct VerifyToken {
    config: Arc<ToolConfig>,
}

impl VerifyToken {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            config: ctx.config.clone(),
        }
    }
}

#[async_trait]
impl Tool for VerifyToken {
    fn name(&self) -> &str {
        "verifyToken"
    }

    fn description(&self) -> &str {
        "Verifies a signed JWT and reports whether it is valid, expired or malformed."
    }

    fn required_params(&self) -> &[&str] {
        &["token"]
    }

    fn demo_body(&self) -> Value {
        json!({ "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..." })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "state": "valid",
            "claims": { "sub": "user-123", "exp": 1767225600 }
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let token = args.get_string("token")?;
        let secret = required(&self.config.jwt_secret, "JWT_SECRET")?;

        let status = verify_token(secret, &token);
        Ok(match status {
            TokenStatus::Valid(claims) => ToolOutput::success(json!({
                "status": true,
                "state": "valid",
                "claims": claims,
            })),
            TokenStatus::Expired => ToolOutput::failure(json!({
                "status": false,
                "state": "expired",
                "message": "Token has expired",
            })),
            TokenStatus::Malformed(reason) => ToolOutput::failure(json!({
                "status": false,
                "state": "malformed",
                "message": reason,
            })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::Database;
    use jsonwebtoken::{encode, EncodingKey, Header};

    async fn tool(secret: Option<&str>) -> VerifyToken {
        let config = ToolConfig {
            jwt_secret: secret.map(str::to_string),
            ..Default::default()
        };
        VerifyToken::new(&ToolContext::new(config, Database::in_memory().await.unwrap()).unwrap())
    }

    fn signed(secret: &str, exp_offset: i64) -> String {
        let claims = json!({ "sub": "user-1", "exp": chrono::Utc::now().timestamp() + exp_offset });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn args(token: &str) -> ToolArgs {
        ToolArgs::from_value(json!({ "token": token })).unwrap()
    }

    #[tokio::test]
    async fn test_states() {
        let tool = tool(Some("s3cret")).await;

        let valid = tool.execute(args(&signed("s3cret", 600))).await.unwrap();
        assert!(valid.success);
        assert_eq!(valid.content["state"], "valid");
        assert_eq!(valid.content["claims"]["sub"], "user-1");

        let expired = tool.execute(args(&signed("s3cret", -600))).await.unwrap();
        assert!(!expired.success);
        assert_eq!(expired.content["state"], "expired");

        let forged = tool.execute(args(&signed("other", 600))).await.unwrap();
        assert_eq!(forged.content["state"], "malformed");

        let garbage = tool.execute(args("abc.def")).await.unwrap();
        assert_eq!(garbage.content["state"], "malformed");
    }

    #[tokio::test]
    async fn test_requires_secret() {
        let err = tool(None).await.execute(args("abc")).await.unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured("JWT_SECRET")));
    }
}
