//! Combined configuration file.
//!
//! One TOML document carries both the `[inference]` table (backend
//! selection) and the `[assistant]` table (prompting behaviour):
//!
//! ```toml
//! [inference]
//! default = "gemini"
//!
//! [inference.gemini]
//! api_key = "${GEMINI_API_KEY}"
//! model = "gemini-2.0-flash"
//! fallback_model = "gemini-2.0-flash-lite"
//!
//! [assistant]
//! related_notes_heading = "### Related Notes"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use vaultmind_inference::config::substitute_env_vars;
use vaultmind_inference::InferenceConfig;
use vaultmind_rag::AssistantSettings;

/// Everything the CLI needs to build an assistant.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub inference: InferenceConfig,
    pub assistant: AssistantSettings,
}

impl AppConfig {
    /// Load from `path`, else the default config path, else the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let default_path = InferenceConfig::default_config_path();
        if default_path.exists() {
            return Self::from_file(&default_path);
        }

        debug!(
            path = %default_path.display(),
            "No config file found, using environment variables"
        );
        Ok(Self {
            inference: InferenceConfig::from_env(),
            assistant: AssistantSettings::default(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let inference =
            InferenceConfig::from_toml_str(content).context("parsing [inference] table")?;
        let assistant = AssistantSettings::from_toml_str(&substitute_env_vars(content))
            .context("parsing [assistant] table")?;
        Ok(Self {
            inference,
            assistant,
        })
    }
}
