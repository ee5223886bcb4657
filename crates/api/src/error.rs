//! Error envelope for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use toolbox::ToolError;

/// Errors that end a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Tool lookup, validation or upstream failure.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Request body is not valid JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    /// Bearer token missing, expired or forged.
    #[error("{0}")]
    Unauthorized(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Tool(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Tool(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        } else {
            tracing::warn!("Request rejected ({}): {}", status.as_u16(), message);
        }

        let body = serde_json::json!({
            "status": false,
            "message": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
