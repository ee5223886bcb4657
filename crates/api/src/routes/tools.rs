//! Tool dispatch and self-description.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use toolbox::{ToolArgs, ToolError, ToolInterface, ToolOutput};

use crate::auth::authorize;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Parse a request body. An empty body counts as `{}`.
fn parse_body(body: &Bytes) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

/// A tool's own envelope; reported failures come back as 400.
fn respond(output: ToolOutput) -> Response {
    let status = if output.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(output.content)).into_response()
}

/// `POST /tools`: `{"functionName": "...", ...params}`.
pub async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    authorize(&state, &headers)?;
    let body = parse_body(&body)?;
    let output = state.registry.dispatch(body).await?;
    Ok(respond(output))
}

/// `OPTIONS /tools`: every tool's descriptor.
pub async fn list(State(state): State<AppState>) -> Json<Vec<ToolInterface>> {
    Json(state.registry.interfaces())
}

/// `POST /api/:function_name`: the body is the parameter object.
pub async fn run(
    State(state): State<AppState>,
    Path(function_name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    authorize(&state, &headers)?;
    let params = ToolArgs::from_value(parse_body(&body)?)?.params;
    let output = state.registry.execute(&function_name, params).await?;
    Ok(respond(output))
}

/// `OPTIONS /api/:function_name`: one tool's descriptor.
pub async fn describe(
    State(state): State<AppState>,
    Path(function_name): Path<String>,
) -> Result<Json<ToolInterface>> {
    let tool = state
        .registry
        .get(&function_name)
        .ok_or_else(|| ToolError::UnknownFunction(function_name.clone()))?;
    Ok(Json(tool.interface()))
}
