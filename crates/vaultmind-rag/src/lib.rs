//! # vaultmind-rag
//!
//! Retrieval-augmented prompting over a vault of markdown notes.
//!
//! A query flows through four stages:
//!
//! 1. [`scope::resolve`] narrows the vault using `@CurrentNote`,
//!    `@Folder/path` and `@Tag:#tag` mentions.
//! 2. [`Retriever`] picks up to three relevant notes, first by asking the
//!    model, then by keyword scoring.
//! 3. [`PromptAssembler`] builds the final prompt with linking instructions.
//! 4. The response is checked for inline and related-note links that point
//!    at real notes.
//!
//! [`Assistant`] ties the stages together and also exposes the note
//! operations built on the same backend.

pub mod assembler;
pub mod atomic;
pub mod completion;
pub mod keywords;
pub mod links;
pub mod pipeline;
pub mod response;
pub mod retriever;
pub mod scope;
pub mod settings;
pub mod synthesis;
pub mod template;

pub use assembler::{ActiveNote, PromptAssembler, PromptInputs};
pub use atomic::{atomic_notes_prompt, moc_body, parse_atomic_notes, AtomicNote};
pub use completion::{
    clean_suggestion, completion_prompt, request_completion, CompletionSession, CompletionTicket,
};
pub use keywords::{extract_keywords, rank_titles, score_title, ScoredTitle};
pub use links::{
    apply_link_suggestions, link_suggestion_prompt, parse_link_suggestions, LinkSuggestion,
};
pub use pipeline::{Assistant, QueryOutcome, QueryRequest};
pub use response::{extract_inline_links, extract_related_notes};
pub use retriever::{RetrievalResult, RetrievalStage, Retriever, RetrieverConfig};
pub use scope::{resolve, ParsedMention, ResolvedScope, ScopeKind, ScopeMention};
pub use settings::{AssistantSettings, AutocompleteSettings, SettingsError};
pub use synthesis::{synthesis_file_name, synthesis_note, synthesis_prompt, SynthesisNote};
pub use template::{note_file_name, render_note_template, template_date};
