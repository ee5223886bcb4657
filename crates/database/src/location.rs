//! Location cache storage.

use sqlx::SqlitePool;

use crate::error::check_key;
use crate::models::ResolvedLocation;
use crate::Result;

/// Look up a cached location by its query key.
pub async fn get_location(pool: &SqlitePool, query_key: &str) -> Result<Option<ResolvedLocation>> {
    let record = sqlx::query_as::<_, ResolvedLocation>(
        r#"
        SELECT zip_code, lat, lon, city, state, country, address
        FROM resolved_locations
        WHERE query_key = ?
        "#,
    )
    .bind(query_key)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Create or overwrite the cached location for a query key.
pub async fn upsert_location(
    pool: &SqlitePool,
    query_key: &str,
    location: &ResolvedLocation,
) -> Result<()> {
    check_key("resolved_locations", query_key)?;

    sqlx::query(
        r#"
        INSERT INTO resolved_locations (query_key, zip_code, lat, lon, city, state, country, address)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(query_key) DO UPDATE SET
            zip_code = excluded.zip_code,
            lat = excluded.lat,
            lon = excluded.lon,
            city = excluded.city,
            state = excluded.state,
            country = excluded.country,
            address = excluded.address,
            updated_at = datetime('now')
        "#,
    )
    .bind(query_key)
    .bind(&location.zip_code)
    .bind(location.lat)
    .bind(location.lon)
    .bind(&location.city)
    .bind(&location.state)
    .bind(&location.country)
    .bind(&location.address)
    .execute(pool)
    .await?;

    Ok(())
}

/// Count cached locations.
pub async fn count_locations(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM resolved_locations
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
