//! Configuration for the chat-completions client.

use std::env;

use triage_core::ChatError;

/// Default HTTP timeout for API requests (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for [`crate::ChatClient`].
#[derive(Debug, Clone)]
pub struct ChatApiConfig {
    /// Base API URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model or deployment name to use.
    pub model: String,

    /// Maximum tokens for response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// HTTP timeout for each model call, in seconds.
    pub timeout_secs: u64,
}

impl Default for ChatApiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: Some(1024),
            temperature: Some(0.2),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ChatApiConfig {
    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `CHAT_API_KEY` - API key for authentication
    ///
    /// Optional (with defaults):
    /// - `CHAT_API_URL` - API URL (default: https://api.openai.com)
    /// - `CHAT_MODEL` - Model name (default: gpt-4o-mini)
    /// - `CHAT_MAX_TOKENS` - Max tokens (default: 1024)
    /// - `CHAT_TEMPERATURE` - Temperature (default: 0.2)
    /// - `CHAT_TIMEOUT_SECS` - Per-call HTTP timeout (default: 60)
    pub fn from_env() -> Result<Self, ChatError> {
        let api_key = env::var("CHAT_API_KEY")
            .map_err(|_| ChatError::Configuration("CHAT_API_KEY not set".to_string()))?;

        let api_url =
            env::var("CHAT_API_URL").unwrap_or_else(|_| "https://api.openai.com".to_string());

        let model = env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let max_tokens = env::var("CHAT_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(1024));

        let temperature = env::var("CHAT_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(0.2));

        let timeout_secs = env::var("CHAT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens,
            temperature,
            timeout_secs,
        })
    }

    /// Start building a configuration programmatically.
    pub fn builder() -> ChatApiConfigBuilder {
        ChatApiConfigBuilder::default()
    }
}

/// Builder for [`ChatApiConfig`].
#[derive(Debug, Default)]
pub struct ChatApiConfigBuilder {
    api_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
}

impl ChatApiConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> ChatApiConfig {
        let defaults = ChatApiConfig::default();
        ChatApiConfig {
            api_url: self.api_url.unwrap_or(defaults.api_url),
            api_key: self.api_key.unwrap_or(defaults.api_key),
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}
