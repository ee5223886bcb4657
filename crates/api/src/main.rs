//! HTTP API for the toolbox.
//!
//! Serves every registered tool over `POST /tools` (dispatch on
//! `functionName`) and `POST /api/:function_name`, with OPTIONS on both for
//! self-description.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use database::Database;
use toolbox::{default_registry, ToolConfig, ToolContext};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    info!(addr = %config.addr, "Starting toolbox API");

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let tool_config = ToolConfig::from_env();
    for (tool, missing) in tool_config.unavailable_tools() {
        warn!(tool, missing = %missing.join(", "), "Tool is missing configuration");
    }
    if tool_config.jwt_secret.is_none() {
        warn!("JWT_SECRET is not set; tool routes are unauthenticated");
    }

    let jwt_secret = tool_config.jwt_secret.clone();
    let ctx = ToolContext::new(tool_config, db)?;
    let registry = default_registry(&ctx);
    info!(tools = registry.len(), "Tool registry ready");

    let state = AppState::new(registry, jwt_secret);

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!(addr = %config.addr, "Toolbox API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
