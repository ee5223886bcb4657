//! Web page screenshots, rendered by screenshotone and hosted on Cloudinary.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::config::{required, ToolConfig};
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::media::{MediaHost, ResourceKind};
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::upstream::{endpoint, ensure_success};

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 800;
const MAX_DIMENSION: f64 = 5000.0;
const FOLDER: &str = "screenshots";

pub struct CaptureScreenshot {
    http: reqwest::Client,
    config: Arc<ToolConfig>,
    media: Arc<MediaHost>,
}

impl CaptureScreenshot {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            http: ctx.http.clone(),
            config: ctx.config.clone(),
            media: ctx.media.clone(),
        }
    }
}

fn target_url(raw: &str) -> Result<Url, ToolError> {
    let url = Url::parse(raw).map_err(|e| ToolError::invalid("url", e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ToolError::invalid("url", format!("unsupported scheme '{}'", other))),
    }
}

fn dimension(args: &ToolArgs, key: &str, default: u32) -> Result<u32, ToolError> {
    match args.get_number_opt(key)? {
        None => Ok(default),
        Some(n) if n.fract() == 0.0 && (1.0..=MAX_DIMENSION).contains(&n) => Ok(n as u32),
        Some(_) => Err(ToolError::invalid(key, "must be a whole number from 1 to 5000")),
    }
}

#[async_trait]
impl Tool for CaptureScreenshot {
    fn name(&self) -> &str {
        "captureScreenshot"
    }

    fn description(&self) -> &str {
        "Takes a PNG screenshot of a web page and returns a hosted image URL. \
         Optional: fullPage, width, height."
    }

    fn required_params(&self) -> &[&str] {
        &["url"]
    }

    fn demo_body(&self) -> Value {
        json!({ "url": "https://example.com", "fullPage": false, "width": 1280, "height": 800 })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "url": "https://example.com/",
            "imageUrl": "https://res.cloudinary.com/demo/image/upload/v1/screenshots/abc123.png",
            "publicId": "screenshots/abc123"
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let target = target_url(&args.get_string("url")?)?;
        let full_page = args.get_bool_or("fullPage", false);
        let width = dimension(&args, "width", DEFAULT_WIDTH)?;
        let height = dimension(&args, "height", DEFAULT_HEIGHT)?;

        let access_key = required(&self.config.screenshot_access_key, "SCREENSHOT_ACCESS_KEY")?;
        let url = endpoint(&self.config.screenshot_url, &["take"])?;

        debug!("Capturing {} ({}x{}, full_page={})", target, width, height, full_page);

        let response = self
            .http
            .get(url)
            .query(&[
                ("access_key", access_key.to_string()),
                ("url", target.to_string()),
                ("full_page", full_page.to_string()),
                ("viewport_width", width.to_string()),
                ("viewport_height", height.to_string()),
                ("format", "png".to_string()),
            ])
            .send()
            .await?;
        let image = ensure_success(response, "Screenshot service").await?.bytes().await?;

        let uploaded = self
            .media
            .upload(&image, "image/png", ResourceKind::Image, FOLDER)
            .await?;
        info!("Screenshot of {} hosted at {}", target, uploaded.secure_url);

        Ok(ToolOutput::success(json!({
            "status": true,
            "url": target.as_str(),
            "imageUrl": uploaded.secure_url,
            "publicId": uploaded.public_id,
        })))
    }
}
