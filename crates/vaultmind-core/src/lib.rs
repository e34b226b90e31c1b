//! # vaultmind-core
//!
//! Core types, traits, and abstractions for vaultmind.
//!
//! This crate provides the note model and the read-only [`NoteIndex`] that
//! the retrieval pipeline narrows and queries, plus the trait seams
//! ([`GenerationBackend`], [`NoteSource`]) that other vaultmind crates
//! implement.

pub mod defaults;
pub mod error;
pub mod index;
pub mod links;
pub mod logging;
pub mod models;
pub mod tags;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use index::NoteIndex;
pub use links::{extract_wiki_links, WikiLink};
pub use models::*;
pub use tags::{extract_inline_hashtags, normalize_tag};
pub use traits::*;
