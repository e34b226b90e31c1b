//! Gemini inference backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vaultmind_core::defaults::{FALLBACK_GEN_MODEL, GEMINI_URL, GEN_MODEL, GEN_TIMEOUT_SECS};
use vaultmind_core::{Error, GenerationBackend, Result};

use super::types::*;
use crate::error::{to_core_error, ProviderErrorCode};

/// Placeholder key value that counts as "not configured".
const PLACEHOLDER_KEY: &str = "default";

/// Configuration for the Gemini backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key sent as the `key` query parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Primary generation model.
    pub model: String,
    /// Model tried when the primary is missing or rate limited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_model: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: GEMINI_URL.to_string(),
            api_key: None,
            model: GEN_MODEL.to_string(),
            fallback_model: Some(FALLBACK_GEN_MODEL.to_string()),
            timeout_seconds: GEN_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    /// Whether a usable API key is present.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty() && k != PLACEHOLDER_KEY)
    }
}

/// Gemini inference backend bound to a single model.
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        if config.has_api_key() {
            info!(
                "Initializing Gemini backend: url={}, model={}",
                config.base_url, config.model
            );
        } else {
            warn!("Gemini API key not set; generation requests will fail");
        }

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
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if self.config.has_api_key() => key,
            _ => {
                return Err(Error::Config(
                    "Gemini API not initialized. Please check your API key in settings."
                        .to_string(),
                ))
            }
        };

        debug!(
            subsystem = "inference",
            component = "gemini",
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Generating"
        );

        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: (!system.is_empty()).then(|| Content::system(system)),
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: GeminiErrorResponse =
                response.json().await.unwrap_or(GeminiErrorResponse {
                    error: GeminiError {
                        code: status.as_u16(),
                        message: "Unknown error".to_string(),
                        status: String::new(),
                    },
                });
            let code = ProviderErrorCode::from_response(status.as_u16(), &body.error.status);
            warn!(
                subsystem = "inference",
                component = "gemini",
                model = %self.config.model,
                http_status = status.as_u16(),
                error = %body.error.message,
                "Gemini request failed"
            );
            return Err(to_core_error(
                code,
                &format!("Gemini returned {}: {}", status, body.error.message),
            ));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(Content::text)
            .unwrap_or_default();

        debug!("Generation complete, response length: {}", content.len());
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();
        assert_eq!(config.base_url, GEMINI_URL);
        assert_eq!(config.model, GEN_MODEL);
        assert_eq!(config.fallback_model.as_deref(), Some(FALLBACK_GEN_MODEL));
        assert_eq!(config.timeout_seconds, GEN_TIMEOUT_SECS);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_placeholder_key_not_usable() {
        let mut config = GeminiConfig::default();
        assert!(!config.has_api_key());
        config.api_key = Some("default".to_string());
        assert!(!config.has_api_key());
        config.api_key = Some(String::new());
        assert!(!config.has_api_key());
        config.api_key = Some("real-key".to_string());
        assert!(config.has_api_key());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let backend = GeminiBackend::new(GeminiConfig {
            base_url: "http://localhost:9000/v1beta/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            backend.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_with_model_switches_model_only() {
        let backend = GeminiBackend::new(GeminiConfig {
            api_key: Some("k".to_string()),
            ..Default::default()
        })
        .unwrap();
        let lite = backend.with_model("gemini-2.0-flash-lite");
        assert_eq!(lite.model_name(), "gemini-2.0-flash-lite");
        assert_eq!(lite.config().api_key.as_deref(), Some("k"));
        assert!(lite.config().fallback_model.is_none());
        assert_eq!(backend.model_name(), GEN_MODEL);
    }

    #[tokio::test]
    async fn test_generate_without_key_is_config_error() {
        let backend = GeminiBackend::new(GeminiConfig::default()).unwrap();
        let err = backend.generate("hello").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
