//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A canonical location record produced by the location resolver.
///
/// The cache key (`query_key`) and timestamp columns stay in the table and are
/// never selected into this struct, so what callers see is only the location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    /// Postal code, when one is known.
    pub zip_code: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub city: Option<String>,
    /// Two-letter code for U.S. states, otherwise the uppercased name.
    pub state: Option<String>,
    /// ISO 3166-1 alpha-2 code.
    pub country: Option<String>,
    /// Display string, e.g. "Austin, TX 78701, US".
    pub address: String,
}

/// A cached IP geolocation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct IpLookup {
    /// IP address as supplied by the caller.
    pub ip: String,
    /// Raw upstream JSON payload.
    pub data: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// A cached OAuth access token for an upstream provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OAuthToken {
    /// Provider name (e.g., "google").
    pub provider: String,
    pub access_token: String,
    /// Expiry as unix seconds.
    pub expires_at: i64,
    pub updated_at: String,
}
