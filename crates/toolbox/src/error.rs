//! Error types for tool operations.

use thiserror::Error;

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool is registered under the requested function name.
    #[error("Invalid function name")]
    UnknownFunction(String),

    /// Missing required parameter.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Invalid parameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Request is well-formed JSON but semantically unusable.
    #[error("{0}")]
    Validation(String),

    /// A required environment variable is not set.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Upstream lookup failed; details are logged, not returned.
    #[error("Failed to fetch data")]
    FetchFailed,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Cache read or write failed.
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// General execution error.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl ToolError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        ToolError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the caller is at fault (maps to a 4xx response).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ToolError::UnknownFunction(_)
                | ToolError::MissingParameter(_)
                | ToolError::InvalidParameter { .. }
                | ToolError::Validation(_)
                | ToolError::JsonError(_)
        )
    }
}
