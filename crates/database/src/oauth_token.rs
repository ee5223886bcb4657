//! OAuth access token storage.

use sqlx::SqlitePool;

use crate::models::OAuthToken;
use crate::Result;

/// Get the stored token for a provider.
pub async fn get_token(pool: &SqlitePool, provider: &str) -> Result<Option<OAuthToken>> {
    let record = sqlx::query_as::<_, OAuthToken>(
        r#"
        SELECT provider, access_token, expires_at, updated_at
        FROM oauth_tokens
        WHERE provider = ?
        "#,
    )
    .bind(provider)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Create or replace the stored token for a provider.
pub async fn upsert_token(
    pool: &SqlitePool,
    provider: &str,
    access_token: &str,
    expires_at: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO oauth_tokens (provider, access_token, expires_at)
        VALUES (?, ?, ?)
        ON CONFLICT(provider) DO UPDATE SET
            access_token = excluded.access_token,
            expires_at = excluded.expires_at,
            updated_at = datetime('now')
        "#,
    )
    .bind(provider)
    .bind(access_token)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}
