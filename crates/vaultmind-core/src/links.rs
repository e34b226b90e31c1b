//! Wiki-style `[[Target]]` link extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WIKI_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\[\]\n]+?)\]\]").unwrap());

/// A parsed `[[Target#heading|alias]]` link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiLink {
    /// Note title the link points to.
    pub target: String,
    /// Heading anchor after `#`, if any.
    pub heading: Option<String>,
    /// Display text after `|`, if any.
    pub alias: Option<String>,
}

/// Extract every wiki link in `text`, in order of appearance.
///
/// Links with an empty target (`[[#heading]]`, `[[|x]]`) are skipped.
pub fn extract_wiki_links(text: &str) -> Vec<WikiLink> {
    WIKI_LINK
        .captures_iter(text)
        .filter_map(|cap| parse_link(cap.get(1)?.as_str()))
        .collect()
}

fn parse_link(inner: &str) -> Option<WikiLink> {
    let (target_part, alias) = match inner.split_once('|') {
        Some((t, a)) => (t, Some(a.trim().to_string())),
        None => (inner, None),
    };
    let (target, heading) = match target_part.split_once('#') {
        Some((t, h)) => (t, Some(h.trim().to_string())),
        None => (target_part, None),
    };
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    Some(WikiLink {
        target: target.to_string(),
        heading,
        alias,
    })
}
