//! OpenAI-compatible inference backend.
//!
//! Works with any endpoint that speaks `/chat/completions`:
//!
//! - OpenAI cloud API
//! - Ollama (in OpenAI compatibility mode)
//! - vLLM
//! - LM Studio
//!
//! # Example
//!
//! ```rust,no_run
//! use vaultmind_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use vaultmind_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         base_url: "http://localhost:11434/v1".to_string(),
//!         model: "llama3".to_string(),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!     let text = backend.generate("Say hello").await.unwrap();
//!     println!("{}", text);
//! }
//! ```

mod backend;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL};
pub use types::*;
