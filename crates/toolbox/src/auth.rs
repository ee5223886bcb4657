//! HS256 bearer-token verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;

/// Outcome of verifying a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStatus {
    /// Signature and expiry check out; carries the decoded claims.
    Valid(Value),
    /// Well-formed and correctly signed, but past its `exp`.
    Expired,
    /// Bad encoding, bad signature, or missing required claims.
    Malformed(String),
}

impl TokenStatus {
    /// Short label used in responses.
    pub fn label(&self) -> &'static str {
        match self {
            TokenStatus::Valid(_) => "valid",
            TokenStatus::Expired => "expired",
            TokenStatus::Malformed(_) => "malformed",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TokenStatus::Valid(_))
    }
}

/// Verify an HS256 token against a shared secret. A leading `Bearer ` is
/// stripped.
pub fn verify_token(secret: &str, token: &str) -> TokenStatus {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

    let key = DecodingKey::from_secret(secret.as_bytes());
    match decode::<Value>(token, &key, &Validation::new(Algorithm::HS256)) {
        Ok(data) => TokenStatus::Valid(data.claims),
        Err(err) => match err.kind() {
            ErrorKind::ExpiredSignature => TokenStatus::Expired,
            _ => TokenStatus::Malformed(err.to_string()),
        },
    }
}
