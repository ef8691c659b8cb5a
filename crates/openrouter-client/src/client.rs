//! OpenRouter HTTP client implementing [`Completer`] and [`ModelCatalog`].

use async_trait::async_trait;
use completion_core::{
    ChatMessage, Completer, Completion, CompletionError, GenerationParams, ModelCatalog, ModelInfo,
    TokenUsage,
};
use rand::seq::SliceRandom;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ModelsResponse};
use crate::config::OpenRouterConfig;

/// Settlement amount used when the upstream omits usage.
const FALLBACK_TOTAL_TOKENS: u32 = 1;

/// Client for the OpenRouter chat completion and model listing endpoints.
///
/// Each call picks one of the configured API keys at random, which spreads
/// load across keys without any shared state between requests.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OpenRouterConfig) -> Result<Self, CompletionError> {
        if config.api_keys.is_empty() {
            return Err(CompletionError::Configuration(
                "no OpenRouter API keys configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                CompletionError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            api_url = %config.api_url,
            keys = config.api_keys.len(),
            default_model = %config.default_model,
            "OpenRouter client initialized"
        );

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    ///
    /// See [`OpenRouterConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::new(OpenRouterConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    fn api_key(&self) -> &str {
        self.config
            .api_keys
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.api_key())
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.app_title)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CompletionError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Unavailable("request timed out".to_string())
            } else {
                CompletionError::Unavailable(format!("Failed to send request: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        let err = classify_failure(status, &error_text);
        warn!(status = status.as_u16(), kind = err.kind(), "OpenRouter request failed");
        Err(err)
    }
}

/// Map a non-success upstream status to the completion error taxonomy.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> CompletionError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|api_error| api_error.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        CompletionError::RateLimited(message)
    } else if status.is_client_error() {
        CompletionError::Rejected {
            status: status.as_u16(),
            message,
        }
    } else {
        CompletionError::Unavailable(format!("API error ({}): {}", status.as_u16(), message))
    }
}

#[async_trait]
impl Completer for OpenRouterClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: &str,
        params: &GenerationParams,
    ) -> Result<Completion, CompletionError> {
        let url = format!("{}/chat/completions", self.config.api_url);
        let model = if model.trim().is_empty() {
            self.config.default_model.as_str()
        } else {
            model
        };

        let request = ChatCompletionRequest {
            model,
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stream: false,
        };

        debug!(model, messages = messages.len(), "Sending chat completion to OpenRouter");

        let response = self
            .send(self.authorized(self.client.post(&url)).json(&request))
            .await?;

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            CompletionError::Unavailable(format!("Failed to parse response: {}", e))
        })?;

        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            CompletionError::Unavailable("response contained no choices".to_string())
        })?;

        let usage = match completion.usage {
            Some(usage) => TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
            None => {
                warn!(model, "OpenRouter response had no usage, settling minimum");
                TokenUsage::total(FALLBACK_TOTAL_TOKENS)
            }
        };

        debug!(
            model,
            total_tokens = usage.total_tokens,
            finish_reason = ?choice.finish_reason,
            "Received chat completion"
        );

        Ok(Completion {
            id: completion.id,
            model: completion.model.unwrap_or_else(|| model.to_string()),
            content: choice.message.content.unwrap_or_default(),
            usage,
        })
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }
}

#[async_trait]
impl ModelCatalog for OpenRouterClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError> {
        let url = format!("{}/models", self.config.api_url);

        let response = self.send(self.authorized(self.client.get(&url))).await?;

        let models: ModelsResponse = response.json().await.map_err(|e| {
            CompletionError::Unavailable(format!("Failed to parse model list: {}", e))
        })?;

        Ok(models.data)
    }
}
