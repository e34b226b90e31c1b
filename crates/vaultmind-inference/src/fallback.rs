//! Primary/fallback model failover with quota advisory.
//!
//! Wraps two backends bound to different models. A primary failure that a
//! model switch may recover from (missing model, exhausted quota) is retried
//! exactly once on the fallback. An exhausted quota that survives the switch
//! is reported to the user as [`QUOTA_ADVISORY`] text instead of an error.

use async_trait::async_trait;
use tracing::{error, info, warn};

use vaultmind_core::defaults::QUOTA_ADVISORY;
use vaultmind_core::{Error, GenerationBackend, Result};

/// Generation backend with one-step model failover.
pub struct FallbackBackend {
    primary: Box<dyn GenerationBackend>,
    fallback: Option<Box<dyn GenerationBackend>>,
}

impl FallbackBackend {
    /// Wrap a primary backend with no fallback model.
    pub fn new(primary: Box<dyn GenerationBackend>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Set the backend tried when the primary fails recoverably.
    pub fn with_fallback(mut self, fallback: Box<dyn GenerationBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Model name of the fallback backend, if any.
    pub fn fallback_model(&self) -> Option<&str> {
        self.fallback.as_ref().map(|f| f.model_name())
    }

    /// Decide the outcome of a failed primary call.
    async fn recover(&self, primary_err: Error, system: &str, prompt: &str) -> Result<String> {
        if !primary_err.is_fallback_eligible() {
            return Err(primary_err);
        }

        let Some(fallback) = self.fallback.as_ref() else {
            if primary_err.is_rate_limited() {
                warn!(
                    subsystem = "inference",
                    component = "fallback",
                    model = self.primary.model_name(),
                    "Quota exhausted with no fallback model configured"
                );
                return Ok(QUOTA_ADVISORY.to_string());
            }
            return Err(primary_err);
        };

        warn!(
            subsystem = "inference",
            component = "fallback",
            model = self.primary.model_name(),
            fallback_model = fallback.model_name(),
            error = %primary_err,
            "Primary model failed, retrying on fallback"
        );

        let attempt = if system.is_empty() {
            fallback.generate(prompt).await
        } else {
            fallback.generate_with_system(system, prompt).await
        };

        match attempt {
            Ok(text) => {
                info!(
                    subsystem = "inference",
                    component = "fallback",
                    model = fallback.model_name(),
                    "Fallback model succeeded"
                );
                Ok(text)
            }
            Err(e) if e.is_rate_limited() => {
                warn!(
                    subsystem = "inference",
                    component = "fallback",
                    model = fallback.model_name(),
                    "Quota exhausted on fallback model"
                );
                Ok(QUOTA_ADVISORY.to_string())
            }
            Err(e) => {
                error!(
                    subsystem = "inference",
                    component = "fallback",
                    model = fallback.model_name(),
                    error = %e,
                    "Fallback model failed"
                );
                Err(primary_err)
            }
        }
    }
}

#[async_trait]
impl GenerationBackend for FallbackBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self.primary.generate(prompt).await {
            Ok(text) => Ok(text),
            Err(e) => self.recover(e, "", prompt).await,
        }
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        match self.primary.generate_with_system(system, prompt).await {
            Ok(text) => Ok(text),
            Err(e) => self.recover(e, system, prompt).await,
        }
    }

    fn model_name(&self) -> &str {
        self.primary.model_name()
    }
}
