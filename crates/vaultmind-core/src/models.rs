//! Note data model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::defaults::MOC_PREFIX;
use crate::tags::normalize_tag;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A read-only snapshot of one note in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Display title, unique within an index (file stem for on-disk vaults).
    pub title: String,
    /// Vault-relative path with `/` separators.
    pub path: String,
    /// Markdown body.
    pub body: String,
    /// Tags, always stored with a leading `#`.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Note {
    pub fn new(title: impl Into<String>, path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            body: body.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Add tags, normalizing each to carry a leading `#`.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags
            .extend(tags.into_iter().filter_map(|t| normalize_tag(t.as_ref())));
        self
    }

    /// Whether this note acts as a Map of Content.
    pub fn is_moc(&self) -> bool {
        self.title.starts_with(MOC_PREFIX)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Copy of this note with the body cut to at most `max_chars` characters.
    pub fn truncated(&self, max_chars: usize) -> Note {
        Note {
            body: truncate_chars(&self.body, max_chars).to_string(),
            ..self.clone()
        }
    }

    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            title: self.title.clone(),
            path: self.path.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Title/path/tags projection of a note, without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub title: String,
    pub path: String,
    pub tags: BTreeSet<String>,
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Last `max_chars` characters of `text`.
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    match text.char_indices().nth(total - max_chars) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_tags_normalizes_prefix() {
        let note = Note::new("A", "A.md", "").with_tags(["rust", "#cooking"]);
        assert!(note.has_tag("#rust"));
        assert!(note.has_tag("#cooking"));
        assert_eq!(note.tags.len(), 2);
    }

    #[test]
    fn test_is_moc() {
        assert!(Note::new("MOC_Cuisine", "MOC_Cuisine.md", "").is_moc());
        assert!(!Note::new("Cuisine", "Cuisine.md", "").is_moc());
        assert!(!Note::new("moc_lower", "moc_lower.md", "").is_moc());
    }

    #[test]
    fn test_truncated_counts_chars_not_bytes() {
        let note = Note::new("N", "N.md", "éééééé");
        let cut = note.truncated(3);
        assert_eq!(cut.body, "ééé");
        assert_eq!(cut.title, "N");
    }

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_tail_chars() {
        assert_eq!(tail_chars("abcdef", 2), "ef");
        assert_eq!(tail_chars("abc", 5), "abc");
        assert_eq!(tail_chars("àbç", 2), "bç");
    }

    #[test]
    fn test_summary_drops_body() {
        let note = Note::new("T", "dir/T.md", "body").with_tags(["x"]);
        let summary = note.summary();
        assert_eq!(summary.title, "T");
        assert_eq!(summary.path, "dir/T.md");
        assert!(summary.tags.contains("#x"));
    }
}
