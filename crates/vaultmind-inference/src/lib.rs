//! # vaultmind-inference
//!
//! Language model backend abstraction for vaultmind.
//!
//! This crate provides:
//! - Gemini implementation (default, feature `gemini`)
//! - OpenAI-compatible implementation (optional, feature `openai`)
//! - Primary/fallback model failover with a quota advisory
//! - Provider HTTP error classification
//! - Typed JSON-array extraction from free-text model output
//! - Backend selection from TOML files or environment variables
//!
//! # Feature Flags
//!
//! - `gemini` (default): Enable Gemini backend
//! - `openai`: Enable OpenAI-compatible backend
//! - `mock`: Export [`mock::MockGenerationBackend`] for tests in dependent crates
//!
//! # Example
//!
//! ```rust,no_run
//! use vaultmind_inference::{GenerationBackend, InferenceConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = InferenceConfig::from_env().build_backend().unwrap();
//!     let text = backend.generate("Hello").await.unwrap();
//!     println!("{}", text);
//! }
//! ```

pub mod config;
pub mod error;
pub mod fallback;
pub mod response;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "openai")]
pub mod openai;

// Mock generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use vaultmind_core::{Error, GenerationBackend, Result};

pub use config::{BackendKind, ConfigError, ConfigResult, InferenceConfig};
pub use error::{to_core_error, ProviderErrorCode};
pub use fallback::FallbackBackend;
pub use response::{find_json_array, parse_json_array, JsonArrayParse};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiBackend, GeminiConfig};

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};
