//! Two-stage note retrieval.
//!
//! Stage one asks the language model to pick relevant titles from the
//! candidate list. Stage two, used only when stage one yields nothing,
//! scores titles by keyword overlap. Either way every returned title is a
//! candidate title, at most [`MAX_RETRIEVED_NOTES`] notes come back, and each
//! body is cut to [`NOTE_CONTENT_BUDGET`] characters.
//!
//! Retrieval never fails: model errors, unparseable output and invented
//! titles all degrade to "fewer notes".

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use vaultmind_core::defaults::{
    MAX_RETRIEVED_NOTES, MIN_KEYWORD_CHARS, MIN_RETRIEVAL_QUERY_CHARS, NOTE_CONTENT_BUDGET,
};
use vaultmind_core::{GenerationBackend, Note};
use vaultmind_inference::{parse_json_array, JsonArrayParse};

use crate::keywords::{extract_keywords, rank_titles};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Retrieval limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Maximum notes returned.
    pub max_results: usize,
    /// Maximum characters kept from each returned body.
    pub content_budget: usize,
    /// Queries with at most this many characters skip retrieval.
    pub min_query_chars: usize,
    /// Keywords must be longer than this many characters.
    pub min_keyword_chars: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_RETRIEVED_NOTES,
            content_budget: NOTE_CONTENT_BUDGET,
            min_query_chars: MIN_RETRIEVAL_QUERY_CHARS,
            min_keyword_chars: MIN_KEYWORD_CHARS,
        }
    }
}

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Which stage produced a retrieval result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalStage {
    /// The model picked the titles.
    Semantic,
    /// Keyword scoring picked the titles.
    Keyword,
    /// Nothing relevant, or retrieval was skipped.
    None,
}

impl fmt::Display for RetrievalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Keyword => write!(f, "keyword"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Notes chosen for one query, bodies already truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResult {
    pub notes: Vec<Note>,
    pub stage: RetrievalStage,
}

impl RetrievalResult {
    pub fn empty() -> Self {
        Self {
            notes: Vec::new(),
            stage: RetrievalStage::None,
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.notes.iter().map(|n| n.title.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

// =============================================================================
// PROMPT AND VALIDATION
// =============================================================================

/// Prompt asking the model to pick relevant titles.
pub fn semantic_prompt(query: &str, titles: &[String], max_results: usize) -> String {
    let titles_json = serde_json::to_string(titles).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"
You are a retrieval assistant for a personal knowledge base.
USER QUERY: "{query}"

LIST OF ALL NOTE TITLES:
{titles_json}

TASK:
1. Analyze the user's query.
2. Scan the list of titles to find notes that are SEMANTICALLY RELEVANT to the query.
3. Select up to {max_results} titles that might contain the answer.
4. **PRIORITY**: Look for SPECIFIC notes that likely contain the content (e.g., "Popcorn Recipe") rather than broad categories or MOCs (e.g., "MOC_Cuisine") unless the specific note is missing.
5. CRITICAL: You MUST return ONLY titles that EXACTLY match entries in the provided list. Do not invent titles.
6. Return ONLY a JSON array of strings. Example: ["Note A", "Note B"]
7. If no notes are relevant, return [].
"#
    )
}

/// Keep titles present in `candidates`, first occurrence only, at most `limit`.
pub fn validate_titles(raw: Vec<String>, candidates: &HashSet<&str>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter(|t| candidates.contains(t.as_str()))
        .filter(|t| seen.insert(t.clone()))
        .take(limit)
        .collect()
}

// =============================================================================
// RETRIEVER
// =============================================================================

/// Picks relevant notes from a candidate set.
pub struct Retriever {
    backend: Arc<dyn GenerationBackend>,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::with_config(backend, RetrieverConfig::default())
    }

    pub fn with_config(backend: Arc<dyn GenerationBackend>, config: RetrieverConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Pick up to `max_results` notes from `candidates` relevant to `query`.
    ///
    /// `query` should already have its scope mentions removed.
    #[instrument(skip(self, candidates), fields(
        subsystem = "rag",
        component = "retriever",
        op = "retrieve",
        query = %query,
        candidate_count = candidates.len(),
    ))]
    pub async fn retrieve(&self, query: &str, candidates: &[Note]) -> RetrievalResult {
        let start = Instant::now();

        if query.chars().count() <= self.config.min_query_chars {
            debug!("Query below retrieval threshold, skipping");
            return RetrievalResult::empty();
        }
        if candidates.is_empty() {
            debug!("No candidates in scope, skipping");
            return RetrievalResult::empty();
        }

        let titles: Vec<String> = candidates.iter().map(|n| n.title.clone()).collect();

        let mut stage = RetrievalStage::Semantic;
        let mut selected = self.semantic_titles(query, &titles).await;

        if selected.is_empty() {
            debug!("Semantic stage yielded no titles, trying keyword scoring");
            let keywords = extract_keywords(query, self.config.min_keyword_chars);
            selected = rank_titles(&titles, &keywords, self.config.max_results)
                .into_iter()
                .map(|s| s.title)
                .collect();
            stage = RetrievalStage::Keyword;
        }

        if selected.is_empty() {
            debug!(
                duration_ms = start.elapsed().as_millis() as u64,
                "No relevant notes found"
            );
            return RetrievalResult::empty();
        }

        let notes: Vec<Note> = selected
            .iter()
            .filter_map(|title| candidates.iter().find(|n| &n.title == title))
            .map(|n| n.truncated(self.config.content_budget))
            .collect();

        info!(
            retrieval_stage = %stage,
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Retrieval complete"
        );

        RetrievalResult { notes, stage }
    }

    /// Semantic stage. Any failure yields an empty list.
    async fn semantic_titles(&self, query: &str, titles: &[String]) -> Vec<String> {
        let prompt = semantic_prompt(query, titles, self.config.max_results);

        let response = match self.backend.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Semantic retrieval request failed");
                return Vec::new();
            }
        };

        let raw = match parse_json_array::<String>(&response) {
            JsonArrayParse::Parsed(items) => items,
            JsonArrayParse::NoArray => {
                debug!("Semantic retrieval response had no JSON array");
                return Vec::new();
            }
            JsonArrayParse::Malformed(reason) => {
                warn!(error = %reason, "Semantic retrieval response was malformed");
                return Vec::new();
            }
        };

        let candidate_set: HashSet<&str> = titles.iter().map(String::as_str).collect();
        let raw_count = raw.len();
        let validated = validate_titles(raw, &candidate_set, self.config.max_results);

        debug!(
            raw_count,
            result_count = validated.len(),
            discarded_count = raw_count.saturating_sub(validated.len()),
            "Semantic titles validated"
        );
        validated
    }
}
