//! Upstream endpoints and credentials for the tools.

use std::env;

use crate::error::ToolError;

/// Configuration shared by every tool.
///
/// Base URLs default to the public endpoints and can be overridden (tests
/// point them at a mock server). Credentials are optional here; tools that
/// need one fail with [`ToolError::NotConfigured`] when it is missing.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Nominatim-compatible geocoder.
    pub geocoder_url: String,
    /// User agent sent to the geocoder (Nominatim rejects anonymous clients).
    pub geocoder_user_agent: String,
    /// Country filter used for zip-code lookups.
    pub default_country: String,

    pub openweather_url: String,
    pub openweather_api_key: Option<String>,

    pub ipinfo_url: String,
    pub ipinfo_token: Option<String>,

    pub brave_search_url: String,
    pub brave_api_key: Option<String>,

    pub screenshot_url: String,
    pub screenshot_access_key: Option<String>,

    pub cloudinary_url: String,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,

    pub whatsapp_url: String,
    pub whatsapp_phone_number_id: Option<String>,
    pub whatsapp_access_token: Option<String>,

    pub twilio_url: String,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,

    pub google_oauth_url: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_refresh_token: Option<String>,
    pub gmail_url: String,
    /// `From` address for `sendEmail`; Gmail replaces it unless it is the
    /// account or one of its verified aliases.
    pub gmail_sender: Option<String>,
    pub google_docs_url: String,
    pub google_sheets_url: String,

    pub openai_url: String,
    pub openai_api_key: Option<String>,
    pub tts_model: String,
    pub stt_model: String,

    /// HS256 secret for bearer tokens and `verifyToken`.
    pub jwt_secret: Option<String>,

    /// Timeout applied to every upstream request.
    pub http_timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            geocoder_user_agent: "toolbox/0.1".to_string(),
            default_country: "us".to_string(),
            openweather_url: "https://api.openweathermap.org".to_string(),
            openweather_api_key: None,
            ipinfo_url: "https://ipinfo.io".to_string(),
            ipinfo_token: None,
            brave_search_url: "https://api.search.brave.com".to_string(),
            brave_api_key: None,
            screenshot_url: "https://api.screenshotone.com".to_string(),
            screenshot_access_key: None,
            cloudinary_url: "https://api.cloudinary.com".to_string(),
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            whatsapp_url: "https://graph.facebook.com/v19.0".to_string(),
            whatsapp_phone_number_id: None,
            whatsapp_access_token: None,
            twilio_url: "https://api.twilio.com".to_string(),
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from_number: None,
            google_oauth_url: "https://oauth2.googleapis.com".to_string(),
            google_client_id: None,
            google_client_secret: None,
            google_refresh_token: None,
            gmail_url: "https://gmail.googleapis.com".to_string(),
            gmail_sender: None,
            google_docs_url: "https://docs.googleapis.com".to_string(),
            google_sheets_url: "https://sheets.googleapis.com".to_string(),
            openai_url: "https://api.openai.com".to_string(),
            openai_api_key: None,
            tts_model: "tts-1".to_string(),
            stt_model: "whisper-1".to_string(),
            jwt_secret: None,
            http_timeout_secs: 30,
        }
    }
}

/// Which environment variables each tool needs. Tools not listed need none.
pub const ENV_RULES: &[(&str, &[&str])] = &[
    ("getWeather", &["OPENWEATHER_API_KEY"]),
    ("lookupIp", &["IPINFO_TOKEN"]),
    ("webSearch", &["BRAVE_API_KEY"]),
    (
        "captureScreenshot",
        &[
            "SCREENSHOT_ACCESS_KEY",
            "CLOUDINARY_CLOUD_NAME",
            "CLOUDINARY_API_KEY",
            "CLOUDINARY_API_SECRET",
        ],
    ),
    ("sendWhatsapp", &["WHATSAPP_PHONE_NUMBER_ID", "WHATSAPP_ACCESS_TOKEN"]),
    (
        "sendSms",
        &["TWILIO_ACCOUNT_SID", "TWILIO_AUTH_TOKEN", "TWILIO_FROM_NUMBER"],
    ),
    (
        "makeCall",
        &["TWILIO_ACCOUNT_SID", "TWILIO_AUTH_TOKEN", "TWILIO_FROM_NUMBER"],
    ),
    (
        "sendEmail",
        &[
            "GOOGLE_CLIENT_ID",
            "GOOGLE_CLIENT_SECRET",
            "GOOGLE_REFRESH_TOKEN",
            "GMAIL_SENDER",
        ],
    ),
    ("createGoogleDoc", GOOGLE_VARS),
    ("readGoogleDoc", GOOGLE_VARS),
    ("createGoogleSheet", GOOGLE_VARS),
    ("appendGoogleSheet", GOOGLE_VARS),
    ("readGoogleSheet", GOOGLE_VARS),
    (
        "textToSpeech",
        &[
            "OPENAI_API_KEY",
            "CLOUDINARY_CLOUD_NAME",
            "CLOUDINARY_API_KEY",
            "CLOUDINARY_API_SECRET",
        ],
    ),
    ("speechToText", &["OPENAI_API_KEY"]),
    ("verifyToken", &["JWT_SECRET"]),
];

const GOOGLE_VARS: &[&str] = &[
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "GOOGLE_REFRESH_TOKEN",
];

impl ToolConfig {
    /// Create configuration from environment variables.
    ///
    /// Credentials (all optional):
    /// `OPENWEATHER_API_KEY`, `IPINFO_TOKEN`, `BRAVE_API_KEY`,
    /// `SCREENSHOT_ACCESS_KEY`, `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`,
    /// `CLOUDINARY_API_SECRET`, `WHATSAPP_PHONE_NUMBER_ID`,
    /// `WHATSAPP_ACCESS_TOKEN`, `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`,
    /// `TWILIO_FROM_NUMBER`, `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`,
    /// `GOOGLE_REFRESH_TOKEN`, `GMAIL_SENDER`, `OPENAI_API_KEY`, `JWT_SECRET`.
    ///
    /// Overrides: `GEOCODER_URL`, `GEOCODER_USER_AGENT`, `DEFAULT_COUNTRY`,
    /// `OPENWEATHER_URL`, `IPINFO_URL`, `BRAVE_SEARCH_URL`, `SCREENSHOT_URL`,
    /// `CLOUDINARY_URL`, `WHATSAPP_URL`, `TWILIO_URL`, `GOOGLE_OAUTH_URL`,
    /// `GMAIL_URL`, `GOOGLE_DOCS_URL`, `GOOGLE_SHEETS_URL`, `OPENAI_URL`,
    /// `TTS_MODEL`, `STT_MODEL`, `HTTP_TIMEOUT_SECS` (default: 30).
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            geocoder_url: var_or("GEOCODER_URL", defaults.geocoder_url),
            geocoder_user_agent: var_or("GEOCODER_USER_AGENT", defaults.geocoder_user_agent),
            default_country: var_or("DEFAULT_COUNTRY", defaults.default_country),
            openweather_url: var_or("OPENWEATHER_URL", defaults.openweather_url),
            openweather_api_key: var("OPENWEATHER_API_KEY"),
            ipinfo_url: var_or("IPINFO_URL", defaults.ipinfo_url),
            ipinfo_token: var("IPINFO_TOKEN"),
            brave_search_url: var_or("BRAVE_SEARCH_URL", defaults.brave_search_url),
            brave_api_key: var("BRAVE_API_KEY"),
            screenshot_url: var_or("SCREENSHOT_URL", defaults.screenshot_url),
            screenshot_access_key: var("SCREENSHOT_ACCESS_KEY"),
            cloudinary_url: var_or("CLOUDINARY_URL", defaults.cloudinary_url),
            cloudinary_cloud_name: var("CLOUDINARY_CLOUD_NAME"),
            cloudinary_api_key: var("CLOUDINARY_API_KEY"),
            cloudinary_api_secret: var("CLOUDINARY_API_SECRET"),
            whatsapp_url: var_or("WHATSAPP_URL", defaults.whatsapp_url),
            whatsapp_phone_number_id: var("WHATSAPP_PHONE_NUMBER_ID"),
            whatsapp_access_token: var("WHATSAPP_ACCESS_TOKEN"),
            twilio_url: var_or("TWILIO_URL", defaults.twilio_url),
            twilio_account_sid: var("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: var("TWILIO_AUTH_TOKEN"),
            twilio_from_number: var("TWILIO_FROM_NUMBER"),
            google_oauth_url: var_or("GOOGLE_OAUTH_URL", defaults.google_oauth_url),
            google_client_id: var("GOOGLE_CLIENT_ID"),
            google_client_secret: var("GOOGLE_CLIENT_SECRET"),
            google_refresh_token: var("GOOGLE_REFRESH_TOKEN"),
            gmail_url: var_or("GMAIL_URL", defaults.gmail_url),
            gmail_sender: var("GMAIL_SENDER"),
            google_docs_url: var_or("GOOGLE_DOCS_URL", defaults.google_docs_url),
            google_sheets_url: var_or("GOOGLE_SHEETS_URL", defaults.google_sheets_url),
            openai_url: var_or("OPENAI_URL", defaults.openai_url),
            openai_api_key: var("OPENAI_API_KEY"),
            tts_model: var_or("TTS_MODEL", defaults.tts_model),
            stt_model: var_or("STT_MODEL", defaults.stt_model),
            jwt_secret: var("JWT_SECRET"),
            http_timeout_secs: var("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_timeout_secs),
        }
    }

    /// Whether the credential behind an environment variable is set.
    pub fn is_set(&self, var: &str) -> bool {
        let value = match var {
            "OPENWEATHER_API_KEY" => &self.openweather_api_key,
            "IPINFO_TOKEN" => &self.ipinfo_token,
            "BRAVE_API_KEY" => &self.brave_api_key,
            "SCREENSHOT_ACCESS_KEY" => &self.screenshot_access_key,
            "CLOUDINARY_CLOUD_NAME" => &self.cloudinary_cloud_name,
            "CLOUDINARY_API_KEY" => &self.cloudinary_api_key,
            "CLOUDINARY_API_SECRET" => &self.cloudinary_api_secret,
            "WHATSAPP_PHONE_NUMBER_ID" => &self.whatsapp_phone_number_id,
            "WHATSAPP_ACCESS_TOKEN" => &self.whatsapp_access_token,
            "TWILIO_ACCOUNT_SID" => &self.twilio_account_sid,
            "TWILIO_AUTH_TOKEN" => &self.twilio_auth_token,
            "TWILIO_FROM_NUMBER" => &self.twilio_from_number,
            "GOOGLE_CLIENT_ID" => &self.google_client_id,
            "GOOGLE_CLIENT_SECRET" => &self.google_client_secret,
            "GOOGLE_REFRESH_TOKEN" => &self.google_refresh_token,
            "GMAIL_SENDER" => &self.gmail_sender,
            "OPENAI_API_KEY" => &self.openai_api_key,
            "JWT_SECRET" => &self.jwt_secret,
            _ => return false,
        };
        value.is_some()
    }

    /// Environment variables a tool needs but which are not set.
    pub fn missing_for(&self, tool: &str) -> Vec<&'static str> {
        ENV_RULES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(tool))
            .map(|(_, vars)| vars.iter().copied().filter(|v| !self.is_set(v)).collect())
            .unwrap_or_default()
    }

    /// Every tool with at least one missing variable.
    pub fn unavailable_tools(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        ENV_RULES
            .iter()
            .filter_map(|(name, _)| {
                let missing = self.missing_for(name);
                (!missing.is_empty()).then_some((*name, missing))
            })
            .collect()
    }
}

/// Borrow a credential or fail with the name of the variable that sets it.
pub fn required<'a>(value: &'a Option<String>, var: &'static str) -> Result<&'a str, ToolError> {
    value.as_deref().ok_or(ToolError::NotConfigured(var))
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(key: &str, default: String) -> String {
    var(key).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_for_lists_unset_vars() {
        let config = ToolConfig {
            twilio_account_sid: Some("AC123".to_string()),
            ..Default::default()
        };

        assert_eq!(
            config.missing_for("sendSms"),
            vec!["TWILIO_AUTH_TOKEN", "TWILIO_FROM_NUMBER"]
        );
        assert!(config.missing_for("convertLength").is_empty());
        assert!(config.missing_for("resolveLocation").is_empty());
    }

    #[test]
    fn test_unavailable_tools() {
        let config = ToolConfig {
            jwt_secret: Some("secret".to_string()),
            ..Default::default()
        };

        let unavailable = config.unavailable_tools();
        assert!(unavailable.iter().any(|(name, _)| *name == "getWeather"));
        assert!(!unavailable.iter().any(|(name, _)| *name == "verifyToken"));
    }

    #[test]
    fn test_required() {
        let set = Some("key".to_string());
        assert_eq!(required(&set, "X").unwrap(), "key");
        let err = required(&None, "OPENAI_API_KEY").unwrap_err();
        assert_eq!(err.to_string(), "OPENAI_API_KEY is not configured");
    }
}
