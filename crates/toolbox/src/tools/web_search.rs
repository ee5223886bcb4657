//! Web search through the Brave Search API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{required, ToolConfig};
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::upstream::{endpoint, ensure_success};

const DEFAULT_COUNT: u32 = 5;
const MAX_COUNT: u32 = 20;

pub struct WebSearch {
    http: reqwest::Client,
    config: Arc<ToolConfig>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

impl WebSearch {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            http: ctx.http.clone(),
            config: ctx.config.clone(),
        }
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        "webSearch"
    }

    fn description(&self) -> &str {
        "Searches the web and returns the top results (title, url, description). \
         count is 1-20, default 5."
    }

    fn required_params(&self) -> &[&str] {
        &["query"]
    }

    fn demo_body(&self) -> Value {
        json!({ "query": "rust async runtime", "count": 2 })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "query": "rust async runtime",
            "results": [
                {
                    "title": "Tokio - An asynchronous Rust runtime",
                    "url": "https://tokio.rs/",
                    "description": "Tokio is an asynchronous runtime for the Rust programming language."
                }
            ]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let query = args.get_string("query")?;
        let count = match args.get_number_opt("count")? {
            None => DEFAULT_COUNT,
            Some(n) if n.fract() == 0.0 && (1.0..=MAX_COUNT as f64).contains(&n) => n as u32,
            Some(_) => return Err(ToolError::invalid("count", "must be a whole number from 1 to 20")),
        };

        let api_key = required(&self.config.brave_api_key, "BRAVE_API_KEY")?;
        let url = endpoint(&self.config.brave_search_url, &["res", "v1", "web", "search"])?;

        debug!("Searching for '{}' (count={})", query, count);
        let count_param = count.to_string();

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .query(&[("q", query.as_str()), ("count", count_param.as_str())])
            .send()
            .await?;

        let body: SearchResponse = ensure_success(response, "Brave Search").await?.json().await?;
        let results: Vec<Value> = body
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .take(count as usize)
            .map(|r| json!({ "title": r.title, "url": r.url, "description": r.description }))
            .collect();

        Ok(ToolOutput::success(json!({
            "status": true,
            "query": query,
            "results": results,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::Database;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn tool(server: &MockServer) -> WebSearch {
        let config = ToolConfig {
            brave_search_url: server.uri(),
            brave_api_key: Some("brave-key".to_string()),
            ..Default::default()
        };
        WebSearch::new(&ToolContext::new(config, Database::in_memory().await.unwrap()).unwrap())
    }

    fn args(value: Value) -> ToolArgs {
        ToolArgs::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_search_maps_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .and(header("X-Subscription-Token", "brave-key"))
            .and(query_param("q", "tokio"))
            .and(query_param("count", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "web": {"results": [
                    {"title": "Tokio", "url": "https://tokio.rs/", "description": "Async runtime", "age": "1d"},
                    {"title": "Docs", "url": "https://docs.rs/tokio"}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = tool(&server).await.execute(args(json!({"query": "tokio"}))).await.unwrap();

        let results = output.content["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["url"], "https://tokio.rs/");
        assert_eq!(results[1]["description"], "");
        assert!(results[0].get("age").is_none());
    }

    #[tokio::test]
    async fn test_missing_web_section_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "search"})))
            .mount(&server)
            .await;

        let output = tool(&server).await.execute(args(json!({"query": "zzzz"}))).await.unwrap();
        assert_eq!(output.content["results"], json!([]));
    }

    #[tokio::test]
    async fn test_count_bounds() {
        let server = MockServer::start().await;
        let tool = tool(&server).await;

        for count in [json!(0), json!(21), json!(2.5)] {
            let err = tool
                .execute(args(json!({"query": "x", "count": count})))
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::InvalidParameter { .. }));
        }
    }
}
