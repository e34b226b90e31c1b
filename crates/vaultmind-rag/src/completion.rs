//! Inline autocomplete.
//!
//! Each editor owns a [`CompletionSession`]. Every request takes a ticket
//! from the session; anything that moves the cursor or edits the text calls
//! [`CompletionSession::invalidate`]. A response is only surfaced if its
//! ticket is still the newest one when it arrives.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use vaultmind_core::defaults::{
    COMPLETION_MAX_AFTER, COMPLETION_MAX_BEFORE, COMPLETION_MAX_SUGGESTION, COMPLETION_MIN_PREFIX,
};
use vaultmind_core::{tail_chars, truncate_chars, GenerationBackend};

// =============================================================================
// PROMPT
// =============================================================================

/// Prompt for completing the text at `cursor` (a character offset).
///
/// Returns `None` when there is too little text before the cursor.
pub fn completion_prompt(text: &str, cursor: usize) -> Option<String> {
    let split = text
        .char_indices()
        .nth(cursor)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let (before, after) = text.split_at(split);

    let before = tail_chars(before, COMPLETION_MAX_BEFORE);
    let after = truncate_chars(after, COMPLETION_MAX_AFTER);

    if before.trim().chars().count() < COMPLETION_MIN_PREFIX {
        return None;
    }

    Some(format!(
        r#"You are an autocomplete assistant for note-taking.
Complete the text at the cursor position <CURSOR>.

RULES:
1. Return ONLY the completion text (what comes after the cursor).
2. Do NOT repeat existing text.
3. Be concise and contextually relevant (max 1-2 sentences).
4. Match the language and tone of the surrounding text.
5. If the text after cursor already continues the thought, return nothing.

TEXT BEFORE CURSOR:
{before}

<CURSOR>

TEXT AFTER CURSOR:
{after}

COMPLETION:"#
    ))
}

/// First line of the trimmed response, at most
/// [`COMPLETION_MAX_SUGGESTION`] characters. `None` if nothing is left.
pub fn clean_suggestion(raw: &str) -> Option<String> {
    let first = raw.trim().lines().next().unwrap_or("");
    let cleaned = truncate_chars(first, COMPLETION_MAX_SUGGESTION);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Identifies one completion request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionTicket(u64);

/// Per-editor request counter.
#[derive(Debug, Default)]
pub struct CompletionSession {
    generation: AtomicU64,
}

impl CompletionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding every earlier ticket.
    pub fn begin(&self) -> CompletionTicket {
        CompletionTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: CompletionTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Mark every outstanding ticket stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Request a completion for `text` at character offset `cursor`.
///
/// Returns `None` when the prefix is too short, the model fails, the answer
/// is empty, or the request went stale while in flight.
pub async fn request_completion(
    backend: &dyn GenerationBackend,
    session: &CompletionSession,
    text: &str,
    cursor: usize,
) -> Option<String> {
    let prompt = completion_prompt(text, cursor)?;
    let ticket = session.begin();

    let raw = match backend.generate(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                subsystem = "rag",
                component = "completion",
                error = %e,
                "Completion request failed"
            );
            return None;
        }
    };

    if !session.is_current(ticket) {
        debug!(
            subsystem = "rag",
            component = "completion",
            "Discarding stale completion"
        );
        return None;
    }
    clean_suggestion(&raw)
}
