//! Tool registry: the `functionName` dispatch table.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolInterface, ToolOutput};

/// Field in a dispatch body that names the tool to run.
pub const FUNCTION_NAME_FIELD: &str = "functionName";

/// Registry for managing tools.
///
/// Names are matched case-insensitively; registration order is kept so that
/// listings are stable.
pub struct ToolRegistry {
    /// Registered tools keyed by lowercased name.
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Arc::new(tool));
    }

    /// Register a shared tool.
    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name.to_lowercase(), tool);
    }

    /// Get a list of registered tool names, in registration order.
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.values().map(|t| t.name()).collect()
    }

    /// Get a tool by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(&name.trim().to_lowercase())
    }

    /// Check if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get tool descriptions for help text.
    pub fn get_descriptions(&self) -> Vec<(&str, &str)> {
        self.tools
            .values()
            .map(|t| (t.name(), t.description()))
            .collect()
    }

    /// OPTIONS descriptors for every tool.
    pub fn interfaces(&self) -> Vec<ToolInterface> {
        self.tools.values().map(|t| t.interface()).collect()
    }

    /// Execute a tool by name with the given parameters.
    pub async fn execute(
        &self,
        name: &str,
        params: HashMap<String, Value>,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownFunction(name.to_string()))?;

        debug!("Executing tool '{}' with {} params", tool.name(), params.len());

        let result = tool.execute(ToolArgs::new(params)).await?;

        debug!("Tool '{}' completed: success={}", tool.name(), result.success);

        Ok(result)
    }

    /// Dispatch a body of the form `{"functionName": "...", ...params}`.
    ///
    /// The `functionName` field is removed before the remaining fields are
    /// handed to the tool.
    pub async fn dispatch(&self, body: Value) -> Result<ToolOutput, ToolError> {
        let mut args = ToolArgs::from_value(body)?;
        let name = match args.params.remove(FUNCTION_NAME_FIELD) {
            Some(Value::String(name)) if !name.trim().is_empty() => name,
            Some(_) => return Err(ToolError::UnknownFunction(String::new())),
            None => return Err(ToolError::MissingParameter(FUNCTION_NAME_FIELD.to_string())),
        };
        self.execute(&name, args.params).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
