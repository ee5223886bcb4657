//! Liveness probe.

use axum::Json;
use serde_json::{json, Value};

/// `GET /health`. Answers without touching the database or any upstream.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
