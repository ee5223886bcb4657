//! Bearer-token guard for tool execution.

use axum::http::{header, HeaderMap};
use toolbox::auth::{verify_token, TokenStatus};

use crate::error::ApiError;
use crate::state::AppState;

/// Check the `Authorization` header. A no-op unless `JWT_SECRET` is set.
pub fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(secret) = state.jwt_secret.as_deref() else {
        return Ok(());
    };

    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(ApiError::Unauthorized("Missing bearer token"));
    };

    let Ok(value) = value.to_str() else {
        return Err(ApiError::Unauthorized("Invalid token"));
    };

    match verify_token(secret, value) {
        TokenStatus::Valid(_) => Ok(()),
        TokenStatus::Expired => Err(ApiError::Unauthorized("Token has expired")),
        TokenStatus::Malformed(reason) => {
            tracing::debug!("Rejected token: {}", reason);
            Err(ApiError::Unauthorized("Invalid token"))
        }
    }
}
