//! Text-to-speech and speech-to-text through OpenAI's audio endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::config::{required, ToolConfig};
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::media::{MediaHost, ResourceKind};
use crate::tool::{Tool, ToolArgs, ToolOutput};
use crate::upstream::{endpoint, ensure_success};

const VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];
const DEFAULT_VOICE: &str = "alloy";
const MAX_SPEECH_CHARS: usize = 4096;
const FOLDER: &str = "speech";

/// `textToSpeech`: `{text, voice?}` → hosted MP3.
pub struct TextToSpeech {
    http: reqwest::Client,
    config: Arc<ToolConfig>,
    media: Arc<MediaHost>,
}

impl TextToSpeech {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            http: ctx.http.clone(),
            config: ctx.config.clone(),
            media: ctx.media.clone(),
        }
    }
}

#[async_trait]
impl Tool for TextToSpeech {
    fn name(&self) -> &str {
        "textToSpeech"
    }

    fn description(&self) -> &str {
        "Converts text (up to 4096 characters) to spoken MP3 audio and returns a hosted URL. \
         Voices: alloy, echo, fable, onyx, nova, shimmer."
    }

    fn required_params(&self) -> &[&str] {
        &["text"]
    }

    fn demo_body(&self) -> Value {
        json!({ "text": "Hello and welcome.", "voice": "nova" })
    }

    fn demo_response(&self) -> Value {
        json!({
            "status": true,
            "voice": "nova",
            "audioUrl": "https://res.cloudinary.com/demo/video/upload/v1/speech/abc123.mp3",
            "publicId": "speech/abc123"
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let text = args.get_string("text")?;
        if text.chars().count() > MAX_SPEECH_CHARS {
            return Err(ToolError::invalid("text", "must be at most 4096 characters"));
        }

        let voice = args
            .get_string_opt("voice")
            .map(|v| v.to_lowercase())
            .unwrap_or_else(|| DEFAULT_VOICE.to_string());
        if !VOICES.contains(&voice.as_str()) {
            return Err(ToolError::invalid("voice", format!("expected one of {}", VOICES.join(", "))));
        }

        let api_key = required(&self.config.openai_api_key, "OPENAI_API_KEY")?;
        let url = endpoint(&self.config.openai_url, &["v1", "audio", "speech"])?;

        debug!("Synthesizing {} chars with voice {}", text.len(), voice);

        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.config.tts_model,
                "input": text,
                "voice": voice,
                "response_format": "mp3",
            }))
            .send()
            .await?;
        let audio = ensure_success(response, "OpenAI").await?.bytes().await?;

        // Cloudinary files audio under the video resource type.
        let uploaded = self
            .media
            .upload(&audio, "audio/mpeg", ResourceKind::Video, FOLDER)
            .await?;
        info!("Speech hosted at {}", uploaded.secure_url);

        Ok(ToolOutput::success(json!({
            "status": true,
            "voice": voice,
            "audioUrl": uploaded.secure_url,
            "publicId": uploaded.public_id,
        })))
    }
}

#[derive(Debug, Deserialize)]
struct Transcription {
    text: String,
}

/// `speechToText`: `{audioUrl, language?}` → transcript.
pub struct SpeechToText {
    http: reqwest::Client,
    config: Arc<ToolConfig>,
}

impl SpeechToText {
    pub fn new(ctx: &ToolContext) -> Self {
        Self {
            http: ctx.http.clone(),
            config: ctx.config.clone(),
        }
    }

    async fn download(&self, url: Url) -> Result<(Vec<u8>, String), ToolError> {
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response, "Audio source").await?;

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok((response.bytes().await?.to_vec(), mime))
    }
}

/// Upload name for the audio; OpenAI infers the format from the extension.
fn file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| name.contains('.'))
        .map(str::to_string)
        .unwrap_or_else(|| "audio.mp3".to_string())
}

#[async_trait]
impl Tool for SpeechToText {
    fn name(&self) -> &str {
        "speechToText"
    }

    fn description(&self) -> &str {
        "Transcribes an audio file at a public URL. Optional language is an ISO 639-1 code."
    }

    fn required_params(&self) -> &[&str] {
        &["audioUrl"]
    }

    fn demo_body(&self) -> Value {
        json!({ "audioUrl": "https://example.com/voicemail.mp3", "language": "en" })
    }

    fn demo_response(&self) -> Value {
        json!({ "status": true, "text": "Hi, this is Jane. Please call me back." })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let raw_url = args.get_string("audioUrl")?;
        let audio_url = Url::parse(&raw_url)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| ToolError::invalid("audioUrl", "expected an http(s) URL"))?;
        let language = args.get_string_opt("language");

        let api_key = required(&self.config.openai_api_key, "OPENAI_API_KEY")?;
        let name = file_name(&audio_url);
        let (audio, mime) = self.download(audio_url).await?;

        debug!("Transcribing {} ({} bytes, {})", name, audio.len(), mime);

        let mut form = Form::new()
            .text("model", self.config.stt_model.clone())
            .part("file", Part::bytes(audio).file_name(name).mime_str(&mime)?);
        if let Some(language) = language {
            form = form.text("language", language);
        }

        let url = endpoint(&self.config.openai_url, &["v1", "audio", "transcriptions"])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;
        let transcription: Transcription = ensure_success(response, "OpenAI").await?.json().await?;

        Ok(ToolOutput::success(json!({
            "status": true,
            "text": transcription.text,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::Database;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn context(server: &MockServer) -> ToolContext {
        let config = ToolConfig {
            openai_url: server.uri(),
            openai_api_key: Some("sk-test".to_string()),
            cloudinary_url: server.uri(),
            cloudinary_cloud_name: Some("demo".to_string()),
            cloudinary_api_key: Some("123".to_string()),
            cloudinary_api_secret: Some("secret".to_string()),
            ..Default::default()
        };
        ToolContext::new(config, Database::in_memory().await.unwrap()).unwrap()
    }

    fn args(value: Value) -> ToolArgs {
        ToolArgs::from_value(value).unwrap()
    }

    #[test]
    fn test_file_name_from_url() {
        let url = Url::parse("https://cdn.example.com/a/b/voicemail.wav?sig=1").unwrap();
        assert_eq!(file_name(&url), "voicemail.wav");
        let url = Url::parse("https://cdn.example.com/stream").unwrap();
        assert_eq!(file_name(&url), "audio.mp3");
    }

    #[tokio::test]
    async fn test_text_to_speech_hosts_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "tts-1", "voice": "nova", "input": "Hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fake".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/video/upload"))
            .and(body_string_contains("folder=speech"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://res.cloudinary.com/demo/video/upload/speech/x.mp3",
                "public_id": "speech/x"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = TextToSpeech::new(&context(&server).await)
            .execute(args(json!({"text": "Hello", "voice": "Nova"})))
            .await
            .unwrap();

        assert_eq!(output.content["audioUrl"], "https://res.cloudinary.com/demo/video/upload/speech/x.mp3");
        assert_eq!(output.content["voice"], "nova");
    }

    #[tokio::test]
    async fn test_text_to_speech_validation() {
        let server = MockServer::start().await;
        let tool = TextToSpeech::new(&context(&server).await);

        let err = tool
            .execute(args(json!({"text": "hi", "voice": "robot"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameter { .. }));

        let long = "a".repeat(MAX_SPEECH_CHARS + 1);
        let err = tool.execute(args(json!({ "text": long }))).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameter { .. }));
    }

    #[tokio::test]
    async fn test_speech_to_text_uploads_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/memo.m4a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "audio/mp4")
                    .set_body_bytes(b"fake-audio".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .and(body_string_contains("name=\"model\""))
            .and(body_string_contains("whisper-1"))
            .and(body_string_contains("filename=\"memo.m4a\""))
            .and(body_string_contains("name=\"language\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Call me back."})))
            .expect(1)
            .mount(&server)
            .await;

        let output = SpeechToText::new(&context(&server).await)
            .execute(args(json!({
                "audioUrl": format!("{}/files/memo.m4a", server.uri()),
                "language": "en"
            })))
            .await
            .unwrap();

        assert_eq!(output.content, json!({"status": true, "text": "Call me back."}));
    }

    #[tokio::test]
    async fn test_speech_to_text_rejects_bad_url() {
        let server = MockServer::start().await;
        let err = SpeechToText::new(&context(&server).await)
            .execute(args(json!({"audioUrl": "not-a-url"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameter { .. }));
    }
}
