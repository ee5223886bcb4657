//! Exercise the registry against real upstreams.
//!
//! Run with: cargo run -p toolbox --example test_tools
//!
//! Local tools always run. Tools whose credentials are missing from the
//! environment (or `.env`) are skipped.

use database::Database;
use serde_json::{json, Value};
use toolbox::{default_registry, ToolConfig, ToolContext, ToolRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("toolbox=debug")),
        )
        .init();

    println!("=== Toolbox ===\n");

    let config = ToolConfig::from_env();
    let skipped = config.unavailable_tools();
    let db = Database::in_memory().await?;
    let ctx = ToolContext::new(config, db)?;
    let registry = default_registry(&ctx);

    println!("Registered tools:");
    for (name, desc) in registry.get_descriptions() {
        println!("  - {}: {}", name, desc);
    }
    println!();

    let calls = [
        json!({"functionName": "convertLength", "from": "meters", "to": "feet", "value": 1}),
        json!({"functionName": "convertTemperature", "from": "fahrenheit", "to": "celsius", "value": 212}),
        json!({"functionName": "parsePhoneNumber", "phoneNumber": "(202) 456-1111", "country": "US"}),
        json!({"functionName": "resolveLocation", "zipCode": "10001"}),
        json!({"functionName": "resolveLocation", "zipCode": "10001"}),
        json!({"functionName": "getWeather", "city": "Austin", "state": "TX", "country": "US"}),
        json!({"functionName": "lookupIp", "ip": "8.8.8.8"}),
        json!({"functionName": "webSearch", "query": "tokio runtime", "count": 3}),
    ];

    for body in calls {
        let name = body["functionName"].as_str().unwrap_or_default().to_string();
        if let Some((_, missing)) = skipped.iter().find(|(tool, _)| *tool == name) {
            println!("--- {} skipped (missing {}) ---\n", name, missing.join(", "));
            continue;
        }
        run(&registry, &name, body).await;
    }

    println!("=== Done ===");
    Ok(())
}

async fn run(registry: &ToolRegistry, name: &str, body: Value) {
    println!("--- {} ---", name);
    match registry.dispatch(body).await {
        Ok(output) => println!(
            "{}\n",
            serde_json::to_string_pretty(&output.content).unwrap_or_default()
        ),
        Err(e) => println!("error: {}\n", e),
    }
}
