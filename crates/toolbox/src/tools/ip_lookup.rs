//! IP geolocation through ipinfo, cached per address.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use database::{ip_lookup, Database};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{required, ToolConfig};
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::upstream::{endpoint, ensure_success};

/// `lookupIp`: `{ip}` → ipinfo payload.
pub struct IpLookup {
    http: reqwest::Client,
    db: Database,
    config: Arc<ToolConfig>,
}

impl IpLookup {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            http: ctx.http.clone(),
            db: ctx.db.clone(),
            config: ctx.config.clone(),
        }
    }

    async fn fetch(&self, ip: &IpAddr) -> Result<Value, ToolError> {
        let token = required(&self.config.ipinfo_token, "IPINFO_TOKEN")?;
        let ip = ip.to_string();
        let url = endpoint(&self.config.ipinfo_url, &[ip.as_str(), "json"])?;

        debug!("Looking up IP {}", ip);

        let response = self
            .http
            .get(url)
            .query(&[("token", token)])
            .send()
            .await?;

        Ok(ensure_success(response, "ipinfo").await?.json().await?)
    }
}

#[async_trait]
impl Tool for IpLookup {
    fn name(&self) -> &str {
        "lookupIp"
    }

    fn description(&self) -> &str {
        "Looks up geolocation and network details for an IPv4 or IPv6 address."
    }

    fn required_params(&self) -> &[&str] {
        &["ip"]
    }

    fn demo_body(&self) -> Value {
        json!({ "ip": "8.8.8.8" })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "cached": false,
            "data": {
                "ip": "8.8.8.8",
                "hostname": "dns.google",
                "city": "Mountain View",
                "region": "California",
                "country": "US",
                "loc": "37.4056,-122.0775",
                "org": "AS15169 Google LLC",
                "timezone": "America/Los_Angeles"
            }
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let raw = args.get_string("ip")?;
        let ip: IpAddr = raw
            .parse()
            .map_err(|_| ToolError::invalid("ip", "expected an IPv4 or IPv6 address"))?;
        let key = ip.to_string();

        if let Some(row) = ip_lookup::get_ip_lookup(self.db.pool(), &key).await? {
            match serde_json::from_str::<Value>(&row.data) {
                Ok(data) => {
                    debug!("IP cache hit for {}", key);
                    return Ok(ToolOutput::success(json!({
                        "status": true,
                        "cached": true,
                        "data": data,
                    })));
                }
                Err(e) => warn!("Discarding unreadable cached lookup for {}: {}", key, e),
            }
        }

        let data = self.fetch(&ip).await?;
        ip_lookup::upsert_ip_lookup(self.db.pool(), &key, &data.to_string()).await?;

        Ok(ToolOutput::success(json!({
            "status": true,
            "cached": false,
            "data": data,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn tool(server: &MockServer) -> IpLookup {
        let config = ToolConfig {
            ipinfo_url: server.uri(),
            ipinfo_token: Some("ipinfo-token".to_string()),
            ..Default::default()
        };
        let ctx = ToolContext::new(config, Database::in_memory().await.unwrap()).unwrap();
        IpLookup::new(&ctx)
    }

    fn args(value: Value) -> ToolArgs {
        ToolArgs::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/8.8.8.8/json"))
            .and(query_param("token", "ipinfo-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ip": "8.8.8.8", "city": "Mountain View"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tool = tool(&server).await;

        let first = tool.execute(args(json!({"ip": "8.8.8.8"}))).await.unwrap();
        assert_eq!(first.content["cached"], json!(false));
        assert_eq!(first.content["data"]["city"], "Mountain View");

        let second = tool.execute(args(json!({"ip": " 8.8.8.8 "}))).await.unwrap();
        assert_eq!(second.content["cached"], json!(true));
        assert_eq!(second.content["data"], first.content["data"]);
    }

    #[tokio::test]
    async fn test_ipv6_is_canonicalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2001:db8::1/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ip": "2001:db8::1", "bogon": true})))
            .expect(1)
            .mount(&server)
            .await;

        let tool = tool(&server).await;
        let output = tool
            .execute(args(json!({"ip": "2001:0db8:0000:0000:0000:0000:0000:0001"})))
            .await
            .unwrap();
        assert_eq!(output.content["data"]["bogon"], true);
    }

    #[tokio::test]
    async fn test_rejects_invalid_ip() {
        let server = MockServer::start().await;
        let tool = tool(&server).await;

        for ip in ["999.1.1.1", "localhost", "1.2.3"] {
            let err = tool.execute(args(json!({ "ip": ip }))).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidParameter { .. }), "{}", ip);
        }
    }
}
