//! Tool trait definition and types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Arguments passed to a tool for execution.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// Parameters as key-value pairs.
    pub params: HashMap<String, Value>,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters.
    pub fn new(params: HashMap<String, Value>) -> Self {
        Self { params }
    }

    /// Build arguments from a JSON value; anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(map) => Ok(Self::new(map.into_iter().collect())),
            Value::Null => Ok(Self::default()),
            _ => Err(ToolError::Validation(
                "Request body must be a JSON object".to_string(),
            )),
        }
    }

    /// Get a string parameter, returning an error if missing, blank or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        let value = self
            .params
            .get(key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?;

        let s = value
            .as_str()
            .ok_or_else(|| ToolError::invalid(key, "expected string"))?
            .trim();

        if s.is_empty() {
            return Err(ToolError::MissingParameter(key.to_string()));
        }
        Ok(s.to_string())
    }

    /// Get an optional string parameter. Blank strings count as absent.
    pub fn get_string_opt(&self, key: &str) -> Option<String> {
        self.params
            .get(key)?
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    }

    /// Get an optional boolean parameter with a default value.
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        match self.params.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
            _ => default,
        }
    }

    /// Get a number parameter. Numeric strings are accepted, since form and
    /// query callers send everything as text.
    pub fn get_number(&self, key: &str) -> Result<f64, ToolError> {
        self.get_number_opt(key)?
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))
    }

    /// Get an optional number parameter.
    pub fn get_number_opt(&self, key: &str) -> Result<Option<f64>, ToolError> {
        match self.params.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| ToolError::invalid(key, "expected number")),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or_else(|| ToolError::invalid(key, "expected number")),
            Some(_) => Err(ToolError::invalid(key, "expected number")),
        }
    }

    /// Get a parameter that may be a single string or an array of strings.
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>, ToolError> {
        let items: Vec<String> = match self.params.get(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(|s| s.to_string())
                        .ok_or_else(|| ToolError::invalid(key, "expected array of strings"))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(ToolError::invalid(key, "expected string or array of strings")),
        };

        let items: Vec<String> = items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if items.is_empty() {
            return Err(ToolError::MissingParameter(key.to_string()));
        }
        Ok(items)
    }

    /// Get a raw JSON parameter.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.params.get(key).filter(|v| !v.is_null())
    }
}

/// Output from a tool execution.
///
/// `content` is the JSON body returned to the caller as-is. Each tool decides
/// its own envelope; most include a boolean `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Value,
    /// Whether the execution was successful.
    pub success: bool,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(content: Value) -> Self {
        Self {
            content,
            success: true,
        }
    }

    /// Create a failed output.
    pub fn failure(content: Value) -> Self {
        Self {
            content,
            success: false,
        }
    }
}

/// Self-describing interface returned for OPTIONS requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInterface {
    pub function_name: String,
    pub description: String,
    pub required_params: Vec<String>,
    pub demo_body: Value,
    pub demo_response: Value,
}

/// Trait for tools that can be dispatched by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's function name (used for dispatch, matched case-insensitively).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Parameters a request must carry.
    fn required_params(&self) -> &[&str] {
        &[]
    }

    /// Example request body.
    fn demo_body(&self) -> Value {
        Value::Object(Default::default())
    }

    /// Example response body.
    fn demo_response(&self) -> Value {
        serde_json::json!({ "status": true })
    }

    /// The descriptor served for OPTIONS requests.
    fn interface(&self) -> ToolInterface {
        ToolInterface {
            function_name: self.name().to_string(),
            description: self.description().to_string(),
            required_params: self
                .required_params()
                .iter()
                .map(|p| p.to_string())
                .collect(),
            demo_body: self.demo_body(),
            demo_response: self.demo_response(),
        }
    }

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError>;
}
