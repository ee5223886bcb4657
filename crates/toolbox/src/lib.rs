//! Tool registry and third-party API tools.
//!
//! Every tool is a small stateless handler addressed by a `functionName`
//! (matched case-insensitively). Tools receive a flat JSON object of
//! parameters and return their own JSON envelope. Shared dependencies (the
//! HTTP client, the SQLite cache, configuration, OAuth tokens and the media
//! uploader) live in a [`ToolContext`] built once at startup.
//!
//! # Built-in Tools
//!
//! ## Location
//! - [`ResolveLocation`] - zip, coordinates or place name to a canonical record, cached.
//! - [`Weather`] - current conditions for any resolvable location.
//! - [`IpLookup`] - IP geolocation, cached per address.
//!
//! ## Messaging
//! - [`SendWhatsapp`], [`SendSms`], [`MakeCall`], [`SendEmail`] - per-recipient delivery.
//!
//! ## Google Workspace
//! - [`CreateGoogleDoc`], [`ReadGoogleDoc`]
//! - [`CreateGoogleSheet`], [`AppendGoogleSheet`], [`ReadGoogleSheet`]
//!
//! ## Media and search
//! - [`WebSearch`], [`CaptureScreenshot`], [`TextToSpeech`], [`SpeechToText`]
//!
//! ## Local
//! - [`ParsePhoneNumber`], [`VerifyToken`], and one [`UnitConverter`] per
//!   [`UnitCategory`] (`convertLength`, `convertTemperature`, ...).
//!
//! # Example
//!
//! ```rust,ignore
//! use database::Database;
//! use serde_json::json;
//! use toolbox::{default_registry, ToolConfig, ToolContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:toolbox.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let ctx = ToolContext::new(ToolConfig::from_env(), db)?;
//!     let registry = default_registry(&ctx);
//!
//!     let output = registry
//!         .dispatch(json!({"functionName": "convertLength", "from": "meters", "to": "feet", "value": 1}))
//!         .await?;
//!     println!("{}", output.content); // {"from":"meters","result":3.28,...}
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
mod context;
mod error;
pub mod media;
mod registry;
pub mod tokens;
mod tool;
pub mod tools;
mod upstream;

use std::sync::Arc;

pub use config::ToolConfig;
pub use context::ToolContext;
pub use error::ToolError;
pub use registry::{ToolRegistry, FUNCTION_NAME_FIELD};
pub use tool::{Tool, ToolArgs, ToolInterface, ToolOutput};
pub use tools::{
    AppendGoogleSheet, CaptureScreenshot, CreateGoogleDoc, CreateGoogleSheet, IpLookup,
    LocationResolver, MakeCall, ParsePhoneNumber, ReadGoogleDoc, ReadGoogleSheet,
    ResolveLocation, SendEmail, SendSms, SendWhatsapp, SpeechToText, TextToSpeech, UnitCategory,
    UnitConverter, VerifyToken, Weather, WebSearch,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Create a registry with every built-in tool registered against `ctx`.
pub fn default_registry(ctx: &ToolContext) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    let resolver = Arc::new(LocationResolver::new(ctx));

    // Location
    registry.register(ResolveLocation::new(resolver.clone()));
    registry.register(Weather::new(ctx, resolver));
    registry.register(IpLookup::new(ctx));
    registry.register(ParsePhoneNumber::new());

    // Search and media
    registry.register(WebSearch::new(ctx));
    registry.register(CaptureScreenshot::new(ctx));
    registry.register(TextToSpeech::new(ctx));
    registry.register(SpeechToText::new(ctx));

    // Messaging
    registry.register(SendWhatsapp::new(ctx));
    registry.register(SendSms::new(ctx));
    registry.register(MakeCall::new(ctx));
    registry.register(SendEmail::new(ctx));

    // Google Workspace
    registry.register(CreateGoogleDoc::new(ctx));
    registry.register(ReadGoogleDoc::new(ctx));
    registry.register(CreateGoogleSheet::new(ctx));
    registry.register(AppendGoogleSheet::new(ctx));
    registry.register(ReadGoogleSheet::new(ctx));

    // Local
    registry.register(VerifyToken::new(ctx));
    for converter in UnitConverter::all() {
        registry.register(converter);
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_RULES;
    use database::Database;
    use serde_json::json;

    async fn registry() -> ToolRegistry {
        let ctx = ToolContext::new(ToolConfig::default(), Database::in_memory().await.unwrap()).unwrap();
        default_registry(&ctx)
    }

    #[tokio::test]
    async fn test_default_registry_has_every_tool() {
        let registry = registry().await;

        assert_eq!(registry.len(), 24);
        for (name, _) in ENV_RULES {
            assert!(registry.has_tool(name), "{} is not registered", name);
        }
        for name in ["resolveLocation", "parsePhoneNumber", "convertArea", "convertWeight"] {
            assert!(registry.has_tool(name), "{} is not registered", name);
        }
    }

    #[tokio::test]
    async fn test_dispatch_converter_case_insensitive() {
        let output = registry()
            .await
            .dispatch(json!({"functionName": "CONVERTLENGTH", "from": "meters", "to": "feet", "value": 1}))
            .await
            .unwrap();

        assert_eq!(output.content["result"], 3.28);
    }

    #[tokio::test]
    async fn test_interfaces_are_complete() {
        for interface in registry().await.interfaces() {
            assert!(!interface.description.is_empty(), "{}", interface.function_name);
            assert!(interface.demo_response.get("status").is_some(), "{}", interface.function_name);
        }
    }
}
