//! Route handlers for the tool API.

pub mod health;
pub mod home;
pub mod tools;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(home::home))
        // Health check
        .route("/health", get(health::health))
        // Tool endpoints
        .route("/tools", post(tools::dispatch).options(tools::list))
        .route(
            "/api/:function_name",
            post(tools::run).options(tools::describe),
        )
}
