//! Configuration for the OpenRouter client.

use std::env;
use std::time::Duration;

use completion_core::CompletionError;

/// Default OpenRouter API base URL.
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1";

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct:free";

/// Environment variables holding API keys, in lookup order.
const API_KEY_VARS: [&str; 4] = [
    "OPENROUTER_API_KEY",
    "OPENROUTER_API_KEY_1",
    "OPENROUTER_API_KEY_2",
    "OPENROUTER_API_KEY_3",
];

/// Configuration for [`crate::OpenRouterClient`].
#[derive(Clone)]
pub struct OpenRouterConfig {
    /// API base URL (requests go to `{api_url}/chat/completions` and `{api_url}/models`).
    pub api_url: String,

    /// API keys; one is picked at random for every request.
    pub api_keys: Vec<String>,

    /// Model used when the caller passes an empty model id.
    pub default_model: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// How long a fetched model list stays fresh.
    pub models_cache_ttl: Duration,

    /// Value of the `HTTP-Referer` attribution header.
    pub referer: String,

    /// Value of the `X-Title` attribution header.
    pub app_title: String,
}

impl std::fmt::Debug for OpenRouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterConfig")
            .field("api_url", &self.api_url)
            .field("api_keys", &format_args!("<{} redacted>", self.api_keys.len()))
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .field("models_cache_ttl", &self.models_cache_ttl)
            .field("referer", &self.referer)
            .field("app_title", &self.app_title)
            .finish()
    }
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_keys: Vec::new(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            models_cache_ttl: Duration::from_secs(300),
            referer: "http://localhost:3000".to_string(),
            app_title: "AI Multi-Agent Platform".to_string(),
        }
    }
}

impl OpenRouterConfig {
    /// Create configuration from environment variables.
    ///
    /// At least one key is required:
    /// - `OPENROUTER_API_KEY` and/or `OPENROUTER_API_KEY_1` .. `OPENROUTER_API_KEY_3`
    ///
    /// Optional environment variables:
    /// - `OPENROUTER_API_URL` - API URL (default: https://openrouter.ai/api/v1)
    /// - `DEFAULT_MODEL` - Fallback model (default: mistralai/mistral-7b-instruct:free)
    /// - `OPENROUTER_TIMEOUT_SECS` - Request timeout (default: 60)
    /// - `OPENROUTER_MODELS_TTL_SECS` - Model list freshness (default: 300)
    /// - `OPENROUTER_REFERER` - `HTTP-Referer` header (default: http://localhost:3000)
    /// - `OPENROUTER_TITLE` - `X-Title` header (default: AI Multi-Agent Platform)
    pub fn from_env() -> Result<Self, CompletionError> {
        let defaults = Self::default();

        let api_keys: Vec<String> = API_KEY_VARS
            .iter()
            .filter_map(|name| env::var(name).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();

        if api_keys.is_empty() {
            return Err(CompletionError::Configuration(
                "no OpenRouter API keys configured (set OPENROUTER_API_KEY or OPENROUTER_API_KEY_1..3)"
                    .to_string(),
            ));
        }

        let api_url = env::var("OPENROUTER_API_URL").unwrap_or(defaults.api_url);

        let default_model = env::var("DEFAULT_MODEL").unwrap_or(defaults.default_model);

        let timeout = env::var("OPENROUTER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let models_cache_ttl = env::var("OPENROUTER_MODELS_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.models_cache_ttl);

        let referer = env::var("OPENROUTER_REFERER").unwrap_or(defaults.referer);
        let app_title = env::var("OPENROUTER_TITLE").unwrap_or(defaults.app_title);

        Ok(Self {
            api_url,
            api_keys,
            default_model,
            timeout,
            models_cache_ttl,
            referer,
            app_title,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> OpenRouterConfigBuilder {
        OpenRouterConfigBuilder::default()
    }
}

/// Builder for OpenRouterConfig.
#[derive(Debug, Default)]
pub struct OpenRouterConfigBuilder {
    config: OpenRouterConfig,
}

impl OpenRouterConfigBuilder {
    /// Add an API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_keys.push(key.into());
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the fallback model.
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the model list freshness window.
    pub fn models_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.models_cache_ttl = ttl;
        self
    }

    /// Set the attribution headers.
    pub fn attribution(mut self, referer: impl Into<String>, title: impl Into<String>) -> Self {
        self.config.referer = referer.into();
        self.config.app_title = title.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenRouterConfig {
        self.config
    }
}
