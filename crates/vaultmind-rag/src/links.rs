//! Link suggestions for a line of text.
//!
//! The model proposes spans of the line that name existing notes; proposals
//! for notes that do not exist are dropped. Accepted suggestions are written
//! back as `[[Title|original text]]`.

use std::collections::{HashMap, HashSet};

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vaultmind_core::{Error, Result};
use vaultmind_inference::{parse_json_array, JsonArrayParse};

/// One proposed link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSuggestion {
    /// Span of the line to turn into a link.
    pub original_text: String,
    /// Existing note the span should point to.
    pub note_title: String,
    /// Optional reason shown to the user.
    #[serde(default)]
    pub context: Option<String>,
}

pub fn link_suggestion_prompt(line: &str, titles: &[String]) -> String {
    let titles_json = serde_json::to_string(titles).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"
You are a linking assistant for a note-taking app.
TEXT TO ANALYZE: "{line}"

LIST OF ALL NOTE TITLES:
{titles_json}

TASK:
1. Identify phrases in the text that correspond to existing note titles.
2. Return a JSON array of objects: {{ "originalText": "text in paragraph", "noteTitle": "Exact Note Title", "context": "short reason" }}.
3. Only suggest links where the connection is clear.
4. Do not suggest linking common words like "the", "a", "is".
5. Example: If text is "I love popcorn" and note is "Popcorn Recipe", return [{{ "originalText": "popcorn", "noteTitle": "Popcorn Recipe" }}].
"#
    )
}

/// Parse suggestions, keeping only those that point at an existing title
/// and whose span is non-empty.
pub fn parse_link_suggestions(response: &str, titles: &[String]) -> Result<Vec<LinkSuggestion>> {
    let parsed = match parse_json_array::<LinkSuggestion>(response) {
        JsonArrayParse::Parsed(items) => items,
        JsonArrayParse::NoArray => {
            return Err(Error::InvalidInput(
                "No structured suggestions found".to_string(),
            ))
        }
        JsonArrayParse::Malformed(reason) => {
            warn!(error = %reason, "Link suggestions were malformed");
            return Err(Error::Serialization(reason));
        }
    };

    let known: HashSet<&str> = titles.iter().map(String::as_str).collect();
    let total = parsed.len();
    let valid: Vec<LinkSuggestion> = parsed
        .into_iter()
        .filter(|s| known.contains(s.note_title.as_str()))
        .filter(|s| !s.original_text.trim().is_empty())
        .collect();

    debug!(
        subsystem = "rag",
        component = "links",
        result_count = valid.len(),
        discarded_count = total - valid.len(),
        "Link suggestions validated"
    );
    Ok(valid)
}

/// Rewrite `line`, turning every case-insensitive occurrence of each
/// suggestion's span into a link.
///
/// Longer spans win over shorter ones they overlap, and text already turned
/// into a link is not rewritten again.
pub fn apply_link_suggestions(line: &str, selected: &[LinkSuggestion]) -> String {
    let mut ordered: Vec<&LinkSuggestion> = selected
        .iter()
        .filter(|s| !s.original_text.is_empty())
        .collect();
    if ordered.is_empty() {
        return line.to_string();
    }
    ordered.sort_by(|a, b| {
        b.original_text
            .chars()
            .count()
            .cmp(&a.original_text.chars().count())
    });

    let mut by_span: HashMap<String, &LinkSuggestion> = HashMap::new();
    for s in &ordered {
        by_span.entry(s.original_text.to_lowercase()).or_insert(s);
    }

    let pattern = ordered
        .iter()
        .map(|s| regex::escape(&s.original_text))
        .collect::<Vec<_>>()
        .join("|");
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            warn!(error = %e, "Could not build link pattern");
            return line.to_string();
        }
    };

    re.replace_all(line, |caps: &regex::Captures| {
        let matched = &caps[0];
        match by_span.get(&matched.to_lowercase()) {
            Some(s) => format!("[[{}|{}]]", s.note_title, s.original_text),
            None => matched.to_string(),
        }
    })
    .into_owned()
}
