//! `@mention` scope directives.
//!
//! A query may carry directives that narrow which notes retrieval looks at:
//!
//! | Syntax | Effect |
//! |--------|--------|
//! | `@CurrentNote` / `@NoteActuelle` | only the caller's active note |
//! | `@Folder/path` / `@Dossier/path` | notes whose path starts with `path` |
//! | `@Tag:#name` | notes carrying tag `#name` |
//!
//! Every `@word` match is stripped from the query, recognized or not. Only
//! the first recognized mention narrows the candidates; the rest are kept in
//! [`ResolvedScope::mentions`] for logging.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use vaultmind_core::{Note, NoteIndex};

static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\w+)(?:/([^\s]+)|:(#\w+))?").unwrap());

/// Scope kind a mention word refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    CurrentNote,
    Folder,
    Tag,
}

impl ScopeKind {
    /// Map a mention word to a scope kind. Matching is case-sensitive.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "CurrentNote" | "NoteActuelle" => Some(Self::CurrentNote),
            "Folder" | "Dossier" => Some(Self::Folder),
            "Tag" => Some(Self::Tag),
            _ => None,
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentNote => write!(f, "current_note"),
            Self::Folder => write!(f, "folder"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// A raw `@word` match, recognized or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMention {
    pub word: String,
    /// Text after `/`, if present.
    pub path: Option<String>,
    /// `#tag` after `:`, if present.
    pub tag: Option<String>,
}

impl ParsedMention {
    /// The recognized scope this mention expresses, if any.
    pub fn scope(&self) -> Option<ScopeMention> {
        let kind = ScopeKind::from_word(&self.word)?;
        let parameter = match kind {
            ScopeKind::CurrentNote => None,
            ScopeKind::Folder => self.path.clone(),
            ScopeKind::Tag => self.tag.clone(),
        };
        Some(ScopeMention { kind, parameter })
    }
}

/// The mention that decided the candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeMention {
    pub kind: ScopeKind,
    pub parameter: Option<String>,
}

/// Outcome of scope resolution for one query.
#[derive(Debug, Clone)]
pub struct ResolvedScope {
    /// Query with every mention removed and whitespace collapsed.
    pub cleaned_query: String,
    /// First recognized mention, if any.
    pub scope: Option<ScopeMention>,
    /// Every mention found, in query order.
    pub mentions: Vec<ParsedMention>,
    /// Notes eligible for retrieval.
    pub candidates: Vec<Note>,
    /// Human-readable scope, for logs and status lines.
    pub description: String,
}

impl ResolvedScope {
    pub fn candidate_titles(&self) -> Vec<String> {
        self.candidates.iter().map(|n| n.title.clone()).collect()
    }

    pub fn moc_titles(&self) -> Vec<String> {
        self.candidates
            .iter()
            .filter(|n| n.is_moc())
            .map(|n| n.title.clone())
            .collect()
    }
}

/// Parse every mention in `query`.
pub fn parse_mentions(query: &str) -> Vec<ParsedMention> {
    MENTION
        .captures_iter(query)
        .map(|caps| ParsedMention {
            word: caps[1].to_string(),
            path: caps.get(2).map(|m| m.as_str().to_string()),
            tag: caps.get(3).map(|m| m.as_str().to_string()),
        })
        .collect()
}

/// Remove every mention from `query` and collapse whitespace.
pub fn strip_mentions(query: &str) -> String {
    MENTION
        .replace_all(query, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve `query` against `index`.
///
/// `active_note` is the note open in the caller's editor, used by the
/// current-note scope. It is looked up in the index by title so candidates
/// carry the indexed snapshot; a note the index does not know is used as-is.
pub fn resolve(query: &str, index: &NoteIndex, active_note: Option<&Note>) -> ResolvedScope {
    let mentions = parse_mentions(query);
    let cleaned_query = strip_mentions(query);
    let scope = mentions.iter().find_map(ParsedMention::scope);

    let (candidates, description) = match &scope {
        None => (index.notes().to_vec(), "entire vault".to_string()),
        Some(ScopeMention {
            kind: ScopeKind::CurrentNote,
            ..
        }) => match active_note {
            Some(active) => {
                let note = index.get(&active.title).unwrap_or(active).clone();
                let description = format!("current note ({})", note.title);
                (vec![note], description)
            }
            None => (Vec::new(), "current note (none open)".to_string()),
        },
        Some(ScopeMention {
            kind: ScopeKind::Folder,
            parameter: Some(prefix),
        }) => (
            index
                .notes()
                .iter()
                .filter(|n| n.path.starts_with(prefix.as_str()))
                .cloned()
                .collect(),
            format!("folder \"{}\"", prefix),
        ),
        Some(ScopeMention {
            kind: ScopeKind::Tag,
            parameter: Some(tag),
        }) => (
            index
                .notes()
                .iter()
                .filter(|n| n.has_tag(tag))
                .cloned()
                .collect(),
            format!("notes with tag {}", tag),
        ),
        Some(ScopeMention {
            parameter: None, ..
        }) => (index.notes().to_vec(), "entire vault".to_string()),
    };

    debug!(
        subsystem = "rag",
        component = "scope",
        op = "resolve",
        scope = %description,
        mention_count = mentions.len(),
        candidate_count = candidates.len(),
        "Scope resolved"
    );

    ResolvedScope {
        cleaned_query,
        scope,
        mentions,
        candidates,
        description,
    }
}
