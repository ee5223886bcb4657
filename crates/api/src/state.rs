//! Application state shared across handlers.

use std::sync::Arc;

use toolbox::ToolRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Every registered tool, keyed by function name.
    pub registry: Arc<ToolRegistry>,
    /// When set, POST routes require an HS256 bearer token signed with it.
    pub jwt_secret: Option<Arc<str>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(registry: ToolRegistry, jwt_secret: Option<String>) -> Self {
        Self {
            registry: Arc::new(registry),
            jwt_secret: jwt_secret.map(Arc::from),
        }
    }
}
