//! IP lookup cache storage.

use sqlx::SqlitePool;

use crate::error::check_key;
use crate::models::IpLookup;
use crate::Result;

/// Get a cached lookup for an IP address.
pub async fn get_ip_lookup(pool: &SqlitePool, ip: &str) -> Result<Option<IpLookup>> {
    let record = sqlx::query_as::<_, IpLookup>(
        r#"
        SELECT ip, data, updated_at
        FROM ip_lookups
        WHERE ip = ?
        "#,
    )
    .bind(ip)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Create or overwrite the cached payload for an IP address.
pub async fn upsert_ip_lookup(pool: &SqlitePool, ip: &str, data: &str) -> Result<()> {
    check_key("ip_lookups", ip)?;

    sqlx::query(
        r#"
        INSERT INTO ip_lookups (ip, data)
        VALUES (?, ?)
        ON CONFLICT(ip) DO UPDATE SET
            data = excluded.data,
            updated_at = datetime('now')
        "#,
    )
    .bind(ip)
    .bind(data)
    .execute(pool)
    .await?;

    Ok(())
}
