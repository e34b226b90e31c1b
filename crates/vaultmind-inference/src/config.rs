//! Inference configuration system.
//!
//! Selects and configures the generation backend. Configuration can be
//! loaded from:
//! - TOML files (default: ~/.config/vaultmind/config.toml, `[inference]` table)
//! - Environment variables (VAULTMIND_* prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use vaultmind_inference::config::InferenceConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = InferenceConfig::load().expect("Failed to load config");
//! let backend = config.build_backend().expect("Failed to build backend");
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use vaultmind_core::GenerationBackend;

use crate::fallback::FallbackBackend;
#[cfg(feature = "gemini")]
use crate::gemini::{GeminiBackend, GeminiConfig};
#[cfg(feature = "openai")]
use crate::openai::{OpenAIBackend, OpenAIConfig};

static ENV_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing configuration for default backend: {0}")]
    MissingBackend(String),

    #[error("Backend construction failed: {0}")]
    Backend(#[from] vaultmind_core::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Generation backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Gemini,
    OpenAI,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAI => write!(f, "openai"),
        }
    }
}

fn validate_url(label: &str, url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} base_url cannot be empty",
            label
        )));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{} base_url must start with http:// or https://, got: {}",
            label, url
        )));
    }
    Ok(())
}

fn validate_model(label: &str, model: &str, fallback: Option<&str>) -> ConfigResult<()> {
    if model.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} model cannot be empty",
            label
        )));
    }
    if fallback.is_some_and(str::is_empty) {
        return Err(ConfigError::Validation(format!(
            "{} fallback_model cannot be empty when set",
            label
        )));
    }
    Ok(())
}

/// Main inference configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Default backend to use.
    pub default: BackendKind,
    /// Gemini configuration (if enabled).
    #[cfg(feature = "gemini")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiConfig>,
    /// OpenAI configuration (if enabled).
    #[cfg(feature = "openai")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<OpenAIConfig>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            default: BackendKind::Gemini,
            #[cfg(feature = "gemini")]
            gemini: Some(GeminiConfig::default()),
            #[cfg(feature = "openai")]
            openai: None,
        }
    }
}

impl InferenceConfig {
    /// Get the default config file path.
    ///
    /// Returns: ~/.config/vaultmind/config.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("vaultmind");
        path.push("config.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading inference config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            Ok(Self::from_env())
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse the `[inference]` table of a TOML document.
    ///
    /// `${VAR}` references are substituted from the environment first. A
    /// document without an `[inference]` table yields the defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let content = substitute_env_vars(content);

        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            inference: Option<TomlInferenceConfig>,
        }

        #[derive(Deserialize)]
        struct TomlInferenceConfig {
            #[serde(default)]
            default: Option<String>,
            #[cfg(feature = "gemini")]
            #[serde(default)]
            gemini: Option<GeminiConfig>,
            #[cfg(feature = "openai")]
            #[serde(default)]
            openai: Option<OpenAIConfig>,
        }

        let root: TomlRoot = toml::from_str(&content)?;
        let Some(inference) = root.inference else {
            return Ok(Self::default());
        };

        let default = match inference.default {
            Some(name) => name.parse()?,
            None => BackendKind::default(),
        };

        let config = Self {
            default,
            #[cfg(feature = "gemini")]
            gemini: match (default, inference.gemini) {
                (BackendKind::Gemini, None) => Some(GeminiConfig::default()),
                (_, gemini) => gemini,
            },
            #[cfg(feature = "openai")]
            openai: inference.openai,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Recognized: `VAULTMIND_INFERENCE_DEFAULT`, `VAULTMIND_GEMINI_API_KEY`
    /// (or `GEMINI_API_KEY`), `VAULTMIND_GEMINI_URL`, `VAULTMIND_GEMINI_MODEL`,
    /// `VAULTMIND_GEMINI_FALLBACK_MODEL`, `VAULTMIND_OPENAI_URL`,
    /// `VAULTMIND_OPENAI_API_KEY`, `VAULTMIND_OPENAI_MODEL`,
    /// `VAULTMIND_OPENAI_FALLBACK_MODEL`, `VAULTMIND_OPENAI_HTTP_REFERER`,
    /// `VAULTMIND_OPENAI_X_TITLE`.
    pub fn from_env() -> Self {
        let default = env::var("VAULTMIND_INFERENCE_DEFAULT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        #[cfg(feature = "gemini")]
        let gemini = match default {
            BackendKind::Gemini => {
                let base = GeminiConfig::default();
                Some(GeminiConfig {
                    base_url: env::var("VAULTMIND_GEMINI_URL").unwrap_or(base.base_url),
                    api_key: env::var("VAULTMIND_GEMINI_API_KEY")
                        .or_else(|_| env::var("GEMINI_API_KEY"))
                        .ok(),
                    model: env::var("VAULTMIND_GEMINI_MODEL").unwrap_or(base.model),
                    fallback_model: env::var("VAULTMIND_GEMINI_FALLBACK_MODEL")
                        .ok()
                        .or(base.fallback_model),
                    timeout_seconds: base.timeout_seconds,
                })
            }
            BackendKind::OpenAI => None,
        };

        #[cfg(feature = "openai")]
        let openai = match default {
            BackendKind::OpenAI => {
                let base = OpenAIConfig::default();
                Some(OpenAIConfig {
                    base_url: env::var("VAULTMIND_OPENAI_URL").unwrap_or(base.base_url),
                    api_key: env::var("VAULTMIND_OPENAI_API_KEY").ok(),
                    model: env::var("VAULTMIND_OPENAI_MODEL").unwrap_or(base.model),
                    fallback_model: env::var("VAULTMIND_OPENAI_FALLBACK_MODEL").ok(),
                    timeout_seconds: base.timeout_seconds,
                    http_referer: env::var("VAULTMIND_OPENAI_HTTP_REFERER").ok(),
                    x_title: env::var("VAULTMIND_OPENAI_X_TITLE").ok(),
                })
            }
            BackendKind::Gemini => None,
        };

        Self {
            default,
            #[cfg(feature = "gemini")]
            gemini,
            #[cfg(feature = "openai")]
            openai,
        }
    }

    /// Get the list of available (configured) backends.
    pub fn available_backends(&self) -> Vec<BackendKind> {
        #[allow(unused_mut)]
        let mut backends = Vec::new();
        #[cfg(feature = "gemini")]
        if self.gemini.is_some() {
            backends.push(BackendKind::Gemini);
        }
        #[cfg(feature = "openai")]
        if self.openai.is_some() {
            backends.push(BackendKind::OpenAI);
        }
        backends
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.available_backends().contains(&self.default) {
            return Err(ConfigError::MissingBackend(format!(
                "{} is set as default but not configured",
                self.default
            )));
        }

        #[cfg(feature = "gemini")]
        if let Some(ref gemini) = self.gemini {
            validate_url("Gemini", &gemini.base_url)?;
            validate_model("Gemini", &gemini.model, gemini.fallback_model.as_deref())?;
        }

        #[cfg(feature = "openai")]
        if let Some(ref openai) = self.openai {
            validate_url("OpenAI", &openai.base_url)?;
            validate_model("OpenAI", &openai.model, openai.fallback_model.as_deref())?;
        }

        Ok(())
    }

    /// Construct the default backend, wrapped for model fallback.
    pub fn build_backend(&self) -> ConfigResult<Box<dyn GenerationBackend>> {
        self.validate()?;

        match self.default {
            #[cfg(feature = "gemini")]
            BackendKind::Gemini => {
                let config = self.gemini.clone().unwrap_or_default();
                let primary = GeminiBackend::new(config.clone())?;
                let mut backend = FallbackBackend::new(Box::new(primary.clone()));
                if let Some(model) = config.fallback_model.filter(|m| *m != config.model) {
                    backend = backend.with_fallback(Box::new(primary.with_model(model)));
                }
                Ok(Box::new(backend))
            }
            #[cfg(feature = "openai")]
            BackendKind::OpenAI => {
                let config = self.openai.clone().unwrap_or_default();
                let primary = OpenAIBackend::new(config.clone())?;
                let mut backend = FallbackBackend::new(Box::new(primary.clone()));
                if let Some(model) = config.fallback_model.filter(|m| *m != config.model) {
                    backend = backend.with_fallback(Box::new(primary.with_model(model)));
                }
                Ok(Box::new(backend))
            }
            #[allow(unreachable_patterns)]
            other => Err(ConfigError::InvalidBackend(format!(
                "{} support not compiled in",
                other
            ))),
        }
    }
}

/// Substitute environment variables in the format ${VAR_NAME}.
///
/// Unset variables are left as-is.
pub fn substitute_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution_with_value() {
        let content = "api_key = \"${VM_TEST_SUBSTITUTION_VAR}\"";

        env::set_var("VM_TEST_SUBSTITUTION_VAR", "test-value");
        let result = substitute_env_vars(content);
        env::remove_var("VM_TEST_SUBSTITUTION_VAR");

        assert_eq!(result, "api_key = \"test-value\"");
    }

    #[test]
    fn test_env_var_substitution_missing() {
        let content = "api_key = \"${NONEXISTENT_VM_TEST_VAR_12345}\"";
        let result = substitute_env_vars(content);
        assert_eq!(result, content);
    }

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("gemini".parse::<BackendKind>().unwrap(), BackendKind::Gemini);
        assert_eq!("OpenAI".parse::<BackendKind>().unwrap(), BackendKind::OpenAI);
        assert!(matches!(
            "ollama".parse::<BackendKind>(),
            Err(ConfigError::InvalidBackend(_))
        ));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = InferenceConfig::default();
        assert_eq!(config.default, BackendKind::Gemini);
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_inference_table_uses_defaults() {
        let config = InferenceConfig::from_toml_str("[assistant]\nsystem_prompt = \"x\"").unwrap();
        assert_eq!(config.default, BackendKind::Gemini);
    }

    #[test]
    fn test_parse_gemini_table() {
        let toml = r#"
[inference]
default = "gemini"

[inference.gemini]
api_key = "abc"
model = "gemini-pro"
fallback_model = "gemini-lite"
"#;
        let config = InferenceConfig::from_toml_str(toml).unwrap();
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key.as_deref(), Some("abc"));
        assert_eq!(gemini.model, "gemini-pro");
        assert_eq!(gemini.fallback_model.as_deref(), Some("gemini-lite"));
        assert_eq!(gemini.base_url, vaultmind_core::defaults::GEMINI_URL);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let toml = r#"
[inference]
default = "gemini"

[inference.gemini]
base_url = "ftp://nope"
"#;
        let err = InferenceConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = InferenceConfig::from_toml_str("[inference]\ndefault = \"ollama\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBackend(_)));
    }

    #[test]
    fn test_build_backend_reports_primary_model() {
        let config = InferenceConfig::default();
        let backend = config.build_backend().unwrap();
        assert_eq!(backend.model_name(), vaultmind_core::defaults::GEN_MODEL);
    }

    #[test]
    fn test_serialize_inference_config() {
        let config = InferenceConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("default = \"gemini\""));
    }
}
