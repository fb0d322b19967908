use std::env;
use std::time::Duration;

use crate::error::{ArtboxError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4o";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-2";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const DEFAULT_PORT: u16 = 8501;

/// How Korean labels reach the text model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationMode {
    /// Labels are sent verbatim and the model translates them.
    Model,
    /// Labels are mapped to English through the static tables first.
    Dictionary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMode {
    /// The image is requested right after the prompt, in the same action.
    Automatic,
    /// The image waits for a separate explicit action.
    OnDemand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPolicy {
    /// Fetch the image bytes once and keep them next to the URL.
    Cache,
    /// Fetch the image bytes again on every render.
    Refetch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageResponseFormat {
    Url,
    B64Json,
}

impl ImageResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageResponseFormat::Url => "url",
            ImageResponseFormat::B64Json => "b64_json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub image_size: String,
    pub image_format: ImageResponseFormat,
    pub request_timeout: Option<Duration>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        OpenAIConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_size: DEFAULT_IMAGE_SIZE.to_string(),
            image_format: ImageResponseFormat::Url,
            request_timeout: None,
        }
    }
}

impl OpenAIConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = env::var("OPENAI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let image_format = match env::var("ARTBOX_IMAGE_FORMAT").ok().as_deref() {
            Some("b64_json") => ImageResponseFormat::B64Json,
            _ => ImageResponseFormat::Url,
        };
        let request_timeout = env::var("ARTBOX_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        OpenAIConfig {
            api_key,
            base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            text_model: env::var("ARTBOX_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: env::var("ARTBOX_IMAGE_MODEL").unwrap_or(defaults.image_model),
            image_size: env::var("ARTBOX_IMAGE_SIZE").unwrap_or(defaults.image_size),
            image_format,
            request_timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(
        mut self,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        self.text_model = text_model.into();
        self.image_model = image_model.into();
        self
    }

    pub fn with_image_format(mut self, format: ImageResponseFormat) -> Self {
        self.image_format = format;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ArtboxError::Config("OPENAI_API_KEY is not set".into()))
    }
}

/// Which of the form's flow variants is active.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub translation: TranslationMode,
    pub image_mode: ImageMode,
    pub suggestions: bool,
    pub structured_suggestions: bool,
    pub download_policy: DownloadPolicy,
}

impl Default for FlowConfig {
    fn default() -> Self {
        FlowConfig {
            translation: TranslationMode::Model,
            image_mode: ImageMode::Automatic,
            suggestions: false,
            structured_suggestions: false,
            download_policy: DownloadPolicy::Cache,
        }
    }
}

impl FlowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let translation = match env::var("ARTBOX_TRANSLATION").ok().as_deref() {
            Some("dictionary") => TranslationMode::Dictionary,
            _ => TranslationMode::Model,
        };
        let image_mode = match env::var("ARTBOX_IMAGE_MODE").ok().as_deref() {
            Some("on_demand") => ImageMode::OnDemand,
            _ => ImageMode::Automatic,
        };
        let download_policy = match env::var("ARTBOX_DOWNLOAD_POLICY").ok().as_deref() {
            Some("refetch") => DownloadPolicy::Refetch,
            _ => DownloadPolicy::Cache,
        };

        FlowConfig {
            translation,
            image_mode,
            suggestions: env_flag("ARTBOX_SUGGESTIONS"),
            structured_suggestions: env_flag("ARTBOX_STRUCTURED_SUGGESTIONS"),
            download_policy,
        }
    }

    pub fn with_translation(mut self, translation: TranslationMode) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_image_mode(mut self, image_mode: ImageMode) -> Self {
        self.image_mode = image_mode;
        self
    }

    pub fn with_suggestions(mut self, enabled: bool, structured: bool) -> Self {
        self.suggestions = enabled;
        self.structured_suggestions = structured;
        self
    }

    pub fn with_download_policy(mut self, policy: DownloadPolicy) -> Self {
        self.download_policy = policy;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai: OpenAIConfig,
    pub flow: FlowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            openai: OpenAIConfig::default(),
            flow: FlowConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Config {
            port,
            openai: OpenAIConfig::from_env(),
            flow: FlowConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_openai(mut self, config: OpenAIConfig) -> Self {
        self.openai = config;
        self
    }

    pub fn with_flow(mut self, config: FlowConfig) -> Self {
        self.flow = config;
        self
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .map_or(false, |val| matches!(val.trim(), "1" | "true" | "yes" | "on"))
}
