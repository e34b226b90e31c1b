//! OpenAI-compatible inference backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vaultmind_core::defaults::GEN_TIMEOUT_SECS;
use vaultmind_core::{Error, GenerationBackend, Result};

use super::types::*;
use crate::error::{to_core_error, ProviderErrorCode};

/// Default OpenAI API endpoint.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = "gpt-4o-mini";

/// Configuration for OpenAI-compatible backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model to use for generation.
    pub model: String,
    /// Model tried when the primary is missing or rate limited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Optional HTTP-Referer header (OpenRouter app attribution).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_referer: Option<String>,
    /// Optional X-Title header (OpenRouter app attribution).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_title: Option<String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            model: DEFAULT_GEN_MODEL.to_string(),
            fallback_model: None,
            timeout_seconds: GEN_TIMEOUT_SECS,
            http_referer: None,
            x_title: None,
        }
    }
}

/// OpenAI-compatible inference backend.
#[derive(Clone)]
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing OpenAI backend: url={}, model={}",
            config.base_url, config.model
        );

        Ok(Self { client, config })
    }

    /// Same client and credentials, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        let mut config = self.config.clone();
        config.model = model.into();
        config.fallback_model = None;
        Self {
            client: self.client.clone(),
            config,
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }
        if let Some(ref referer) = self.config.http_referer {
            req = req.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.config.x_title {
            req = req.header("X-Title", title);
        }

        req.header("Content-Type", "application/json")
    }
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        debug!(
            subsystem = "inference",
            component = "openai",
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Generating"
        );

        let mut messages = Vec::new();
        if !system.is_empty() {
            messages.push(ChatMessage::new("system", system));
        }
        messages.push(ChatMessage::new("user", prompt));

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
        };

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: OpenAIErrorResponse = response.json().await.unwrap_or(OpenAIErrorResponse {
                error: OpenAIError {
                    message: "Unknown error".to_string(),
                    error_type: "unknown".to_string(),
                    code: None,
                },
            });
            let error_type = body.error.code.as_deref().unwrap_or(&body.error.error_type);
            let code = ProviderErrorCode::from_response(status.as_u16(), error_type);
            warn!(
                subsystem = "inference",
                component = "openai",
                model = %self.config.model,
                http_status = status.as_u16(),
                error = %body.error.message,
                "OpenAI request failed"
            );
            return Err(to_core_error(
                code,
                &format!("OpenAI returned {}: {}", status, body.error.message),
            ));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        debug!("Generation complete, response length: {}", content.len());
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
