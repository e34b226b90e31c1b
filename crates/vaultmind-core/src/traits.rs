//! Core traits for vaultmind abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Note;

// =============================================================================
// NOTE SOURCE
// =============================================================================

/// Read-only access to the host's current note collection.
pub trait NoteSource: Send + Sync {
    /// Snapshot every note currently in the collection.
    fn notes(&self) -> Result<Vec<Note>>;
}

impl NoteSource for Vec<Note> {
    fn notes(&self) -> Result<Vec<Note>> {
        Ok(self.clone())
    }
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation.
///
/// Implementations own model selection and any provider-side fallback.
/// Exhausted quota is reported as an advisory `Ok` string rather than an
/// error; everything else that goes wrong is an `Err` the caller handles.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: GenerationBackend + ?Sized> GenerationBackend for std::sync::Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        (**self).generate_with_system(system, prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: GenerationBackend + ?Sized> GenerationBackend for Box<T> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        (**self).generate_with_system(system, prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
