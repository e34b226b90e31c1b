//! Google Gemini inference backend.
//!
//! Talks to the `generateContent` REST endpoint with an API key passed as a
//! query parameter. Each [`GeminiBackend`] is bound to one model; wrap two of
//! them in a [`FallbackBackend`](crate::FallbackBackend) to get the
//! primary/lite model failover.
//!
//! # Example
//!
//! ```rust,no_run
//! use vaultmind_inference::gemini::{GeminiBackend, GeminiConfig};
//! use vaultmind_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GeminiConfig {
//!         api_key: std::env::var("GEMINI_API_KEY").ok(),
//!         ..Default::default()
//!     };
//!     let backend = GeminiBackend::new(config).unwrap();
//!     let text = backend.generate("Say hello").await.unwrap();
//!     println!("{}", text);
//! }
//! ```

mod backend;
mod types;

pub use backend::{GeminiBackend, GeminiConfig};
pub use types::*;
