//! Centralized default constants for vaultmind.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// RETRIEVAL
// =============================================================================

/// Maximum number of notes the retriever hands to the prompt.
pub const MAX_RETRIEVED_NOTES: usize = 3;

/// Characters of body kept per retrieved note.
pub const NOTE_CONTENT_BUDGET: usize = 1500;

/// Queries at or below this many characters skip retrieval entirely.
pub const MIN_RETRIEVAL_QUERY_CHARS: usize = 5;

/// Keyword fallback ignores words at or below this many characters.
pub const MIN_KEYWORD_CHARS: usize = 3;

/// Score bonus when a keyword equals the whole (lowercased) title.
pub const EXACT_TITLE_BONUS: u32 = 2;

// =============================================================================
// LINKING
// =============================================================================

/// Upper bound on suggestions in the related-notes section.
pub const MAX_RELATED_NOTES: usize = 5;

/// Title prefix that marks a Map of Content note.
pub const MOC_PREFIX: &str = "MOC_";

/// Default heading the model is asked to put above related notes.
pub const RELATED_NOTES_HEADING: &str = "### Related Notes";

// =============================================================================
// NOTE OPERATIONS
// =============================================================================

/// Maximum atomic notes accepted from one decomposition.
pub const MAX_ATOMIC_NOTES: usize = 7;

/// Maximum connected notes read for a graph synthesis.
pub const SYNTHESIS_MAX_NOTES: usize = 10;

/// Characters kept per connected note in a graph synthesis.
pub const SYNTHESIS_NOTE_BUDGET: usize = 1000;

// =============================================================================
// AUTOCOMPLETE
// =============================================================================

/// Characters of text before the cursor sent for completion.
pub const COMPLETION_MAX_BEFORE: usize = 2000;

/// Characters of text after the cursor sent for completion.
pub const COMPLETION_MAX_AFTER: usize = 500;

/// Minimum trimmed prefix length before a completion is requested.
pub const COMPLETION_MIN_PREFIX: usize = 10;

/// Maximum characters of a cleaned completion suggestion.
pub const COMPLETION_MAX_SUGGESTION: usize = 200;

/// Default debounce delay for completions (milliseconds).
pub const AUTOCOMPLETE_DELAY_MS: u64 = 600;

/// Allowed debounce range (milliseconds).
pub const AUTOCOMPLETE_DELAY_MIN_MS: u64 = 300;
pub const AUTOCOMPLETE_DELAY_MAX_MS: u64 = 2000;
pub const AUTOCOMPLETE_DELAY_STEP_MS: u64 = 100;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini API endpoint.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const GEN_MODEL: &str = "gemini-2.0-flash";

/// Cheaper model tried when the primary is missing or rate limited.
pub const FALLBACK_GEN_MODEL: &str = "gemini-2.0-flash-lite";

/// Default HTTP timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Returned in place of a response when every model is out of quota.
pub const QUOTA_ADVISORY: &str =
    "⚠️ Quota exceeded (error 429). Please wait a moment before trying again.";

// =============================================================================
// ASSISTANT
// =============================================================================

/// Default system prompt placed at the top of every assembled prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant integrated into a note-taking app.
Your goal is to help the user manage their personal knowledge base.
Provide detailed, comprehensive, and precise responses. Use Markdown formatting.";

/// Default template for saving a response as a note.
pub const NOTE_TEMPLATE: &str = "### metadata :
- Date : {{DATE}}
- Status : #inprogress #perma
- Topic :
- Links : [[...]]


## Definition :
{{CONTENT}}


## Tips :
-";
