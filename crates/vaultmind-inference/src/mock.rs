//! Mock generation backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vaultmind_inference::mock::MockGenerationBackend;
//! use vaultmind_core::GenerationBackend;
//!
//! #[tokio::test]
//! async fn test_with_mock_backend() {
//!     let backend = MockGenerationBackend::new()
//!         .with_fixed_response("Test response")
//!         .with_response_mapping("LIST OF ALL NOTE TITLES", "[\"Pasta\"]");
//!
//!     let text = backend.generate("hello").await.unwrap();
//!     assert_eq!(text, "Test response");
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use vaultmind_core::{Error, GenerationBackend, Result};

/// Failure kinds the mock can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Network-level failure.
    Transport,
    /// HTTP 429 equivalent.
    RateLimited,
    /// HTTP 404 equivalent.
    ModelNotFound,
}

impl MockFailure {
    fn to_error(self) -> Error {
        match self {
            MockFailure::Transport => Error::Request("Simulated transport failure".to_string()),
            MockFailure::RateLimited => Error::RateLimited("Simulated quota exhaustion".to_string()),
            MockFailure::ModelNotFound => {
                Error::ModelNotFound("Simulated missing model".to_string())
            }
        }
    }
}

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model_name: String,
    response_mappings: Vec<(String, String)>,
    default_response: String,
    failure: Option<MockFailure>,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    /// Failures still to be served before switching to normal responses.
    /// `None` means fail on every call when a failure is configured.
    remaining_failures: Option<usize>,
}

/// A recorded generation call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: Option<String>,
    pub prompt: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model_name: "mock-model".to_string(),
            response_mappings: Vec::new(),
            default_response: "Mock response".to_string(),
            failure: None,
        }
    }
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Set the reported model name.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model_name = name.into();
        self
    }

    /// Set the response returned when no mapping matches.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Return `output` for any prompt containing `needle`.
    ///
    /// Mappings are checked in insertion order; the first match wins.
    pub fn with_response_mapping(
        mut self,
        needle: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .response_mappings
            .push((needle.into(), output.into()));
        self
    }

    /// Fail every call with the given failure.
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(failure);
        self.lock().remaining_failures = None;
        self
    }

    /// Fail the next `count` calls, then respond normally.
    pub fn with_failures(mut self, failure: MockFailure, count: usize) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(failure);
        self.lock().remaining_failures = Some(count);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.lock().calls.clear()
    }

    /// Get number of generation calls.
    pub fn generate_call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not wedge other assertions.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn respond(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(MockCall {
            system: system.map(str::to_string),
            prompt: prompt.to_string(),
        });

        if let Some(failure) = self.config.failure {
            match state.remaining_failures.as_mut() {
                None => return Err(failure.to_error()),
                Some(n) if *n > 0 => {
                    *n -= 1;
                    return Err(failure.to_error());
                }
                Some(_) => {}
            }
        }

        let response = self
            .config
            .response_mappings
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| self.config.default_response.clone());
        Ok(response)
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.respond(None, prompt)
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.respond(Some(system), prompt)
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
