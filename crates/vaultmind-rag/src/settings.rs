//! Assistant settings, the `[assistant]` table of the config file.
//!
//! ```toml
//! [assistant]
//! system_prompt = "You are a terse assistant."
//! related_notes_heading = "### Notes Liées :"
//! include_active_note = true
//!
//! [assistant.autocomplete]
//! enabled = true
//! delay_ms = 800
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use vaultmind_core::defaults::{
    AUTOCOMPLETE_DELAY_MAX_MS, AUTOCOMPLETE_DELAY_MIN_MS, AUTOCOMPLETE_DELAY_MS,
    AUTOCOMPLETE_DELAY_STEP_MS, NOTE_TEMPLATE, RELATED_NOTES_HEADING, SYSTEM_PROMPT,
};

use crate::retriever::RetrieverConfig;

/// Settings loading errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Inline completion behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocompleteSettings {
    pub enabled: bool,
    /// Debounce delay before a completion is requested.
    pub delay_ms: u64,
}

impl Default for AutocompleteSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: AUTOCOMPLETE_DELAY_MS,
        }
    }
}

impl AutocompleteSettings {
    /// Delay clamped to the allowed range and rounded to the nearest step.
    pub fn effective_delay_ms(&self) -> u64 {
        let clamped = self
            .delay_ms
            .clamp(AUTOCOMPLETE_DELAY_MIN_MS, AUTOCOMPLETE_DELAY_MAX_MS);
        let step = AUTOCOMPLETE_DELAY_STEP_MS;
        ((clamped + step / 2) / step * step).min(AUTOCOMPLETE_DELAY_MAX_MS)
    }
}

/// User-facing assistant settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub system_prompt: String,
    /// Template used when a response is saved as a note.
    pub note_template: String,
    pub related_notes_heading: String,
    /// Whether queries include the open note by default.
    pub include_active_note: bool,
    pub autocomplete: AutocompleteSettings,
    pub retrieval: RetrieverConfig,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            note_template: NOTE_TEMPLATE.to_string(),
            related_notes_heading: RELATED_NOTES_HEADING.to_string(),
            include_active_note: true,
            autocomplete: AutocompleteSettings::default(),
            retrieval: RetrieverConfig::default(),
        }
    }
}

impl AssistantSettings {
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse the `[assistant]` table; a missing table yields defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            assistant: Option<AssistantSettings>,
        }

        let root: TomlRoot = toml::from_str(content)?;
        let settings = root.assistant.unwrap_or_default();
        settings.validate()?;
        debug!(
            subsystem = "rag",
            component = "settings",
            autocomplete_enabled = settings.autocomplete.enabled,
            delay_ms = settings.autocomplete.effective_delay_ms(),
            "Assistant settings loaded"
        );
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.related_notes_heading.trim().is_empty() {
            return Err(SettingsError::Validation(
                "related_notes_heading must not be empty".to_string(),
            ));
        }
        if self.retrieval.max_results == 0 {
            return Err(SettingsError::Validation(
                "retrieval.max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
