//! Cloudinary uploads for generated media (screenshots, synthesized speech).

use std::sync::Arc;

use base64::Engine;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::config::{required, ToolConfig};
use crate::error::ToolError;
use crate::upstream::{endpoint, ensure_success};

/// Cloudinary resource type. Audio is stored under `video`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Video,
}

impl ResourceKind {
    fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
        }
    }
}

/// Result of an upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedMedia {
    pub secure_url: String,
    pub public_id: String,
}

/// Signed uploader for a single Cloudinary account.
pub struct MediaHost {
    http: reqwest::Client,
    config: Arc<ToolConfig>,
}

impl MediaHost {
    pub fn new(http: reqwest::Client, config: Arc<ToolConfig>) -> Self {
        Self { http, config }
    }

    /// Upload raw bytes and return the hosted URL.
    pub async fn upload(
        &self,
        bytes: &[u8],
        mime: &str,
        kind: ResourceKind,
        folder: &str,
    ) -> Result<UploadedMedia, ToolError> {
        let config = &self.config;
        let cloud_name = required(&config.cloudinary_cloud_name, "CLOUDINARY_CLOUD_NAME")?;
        let api_key = required(&config.cloudinary_api_key, "CLOUDINARY_API_KEY")?;
        let api_secret = required(&config.cloudinary_api_secret, "CLOUDINARY_API_SECRET")?;

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(&[("folder", folder), ("timestamp", &timestamp)], api_secret);
        let file = format!(
            "data:{};base64,{}",
            mime,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        );

        debug!("Uploading {} bytes of {} to Cloudinary", bytes.len(), mime);

        let url = endpoint(&config.cloudinary_url, &["v1_1", cloud_name, kind.as_str(), "upload"])?;
        let response = self
            .http
            .post(url)
            .form(&[
                ("file", file.as_str()),
                ("api_key", api_key),
                ("folder", folder),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?;

        Ok(ensure_success(response, "Cloudinary").await?.json().await?)
    }
}

/// Cloudinary request signature: SHA-1 over `k=v` pairs sorted by key and
/// joined with `&`, followed by the API secret.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut params = params.to_vec();
    params.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha1::digest(format!("{}{}", to_sign, api_secret).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sign_matches_documented_example() {
        // Example from Cloudinary's signature documentation.
        let signature = sign(
            &[
                ("timestamp", "1315060510"),
                ("public_id", "sample_image"),
                ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop"),
            ],
            "abcd",
        );
        assert_eq!(signature, "bfd09f95f331f558cbd1320e67aa8d488770583e");
    }

    #[tokio::test]
    async fn test_upload_posts_signed_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .and(body_string_contains("api_key=key"))
            .and(body_string_contains("signature="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://res.cloudinary.com/demo/image/upload/shot.png",
                "public_id": "toolbox/shot"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ToolConfig {
            cloudinary_url: server.uri(),
            cloudinary_cloud_name: Some("demo".to_string()),
            cloudinary_api_key: Some("key".to_string()),
            cloudinary_api_secret: Some("secret".to_string()),
            ..Default::default()
        };
        let host = MediaHost::new(reqwest::Client::new(), Arc::new(config));

        let uploaded = host
            .upload(b"\x89PNG", "image/png", ResourceKind::Image, "toolbox")
            .await
            .unwrap();
        assert_eq!(uploaded.public_id, "toolbox/shot");
    }

    #[tokio::test]
    async fn test_upload_requires_credentials() {
        let host = MediaHost::new(reqwest::Client::new(), Arc::new(ToolConfig::default()));
        let err = host
            .upload(b"x", "image/png", ResourceKind::Image, "toolbox")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotConfigured("CLOUDINARY_CLOUD_NAME")));
    }
}
