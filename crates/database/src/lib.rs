//! SQLite cache layer for the toolbox handlers.
//!
//! Every table here is a cache written with upserts: resolved locations keyed
//! by the caller's query, IP lookups keyed by address, and OAuth access tokens
//! keyed by provider. Rows are never deleted.
//!
//! # Example
//!
//! ```no_run
//! use database::{location, Database, ResolvedLocation};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:toolbox.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let austin = ResolvedLocation {
//!         zip_code: Some("78701".to_string()),
//!         lat: 30.2711,
//!         lon: -97.7437,
//!         city: Some("Austin".to_string()),
//!         state: Some("TX".to_string()),
//!         country: Some("US".to_string()),
//!         address: "Austin, TX 78701, US".to_string(),
//!     };
//!     location::upsert_location(db.pool(), r#"{"zipCode":"78701"}"#, &austin).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod ip_lookup;
pub mod location;
pub mod models;
pub mod oauth_token;

pub use error::{DatabaseError, Result};
pub use models::{IpLookup, OAuthToken, ResolvedLocation};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// let db = database::Database::connect("sqlite:data/toolbox.db?mode=rwc").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// In-memory databases (`sqlite::memory:`) are per connection, so callers
    /// using one should pass a pool size of 1.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Open a migrated single-connection in-memory database.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect_with_pool_size("sqlite::memory:", 1).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
