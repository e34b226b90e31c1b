//! Tag normalization and inline hashtag extraction from markdown bodies.
//!
//! Tags are stored with their leading `#` and compared case-sensitively,
//! which is how `@Tag:#name` scope mentions match them.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```[^\n]*\n.*?```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]+`").unwrap());
static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static WIKI_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[[^\]]*\]\]").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static HASHTAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w/#-])#([\p{L}_][\p{L}\p{N}_/-]*)").unwrap());

/// Normalize a raw tag to `#name` form.
///
/// Returns `None` for empty or whitespace-only input.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('#');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("#{}", trimmed))
}

/// Extract inline hashtags from markdown content.
///
/// # Rules
///
/// 1. A hashtag is `#` followed by a letter or underscore
/// 2. It may continue with letters, digits, `_`, `-` and `/` (nested tags)
/// 3. Markdown headings (`# Heading`) are not tags
/// 4. Fenced code blocks, inline code, URLs and link targets are skipped
/// 5. Case is preserved; duplicates are removed
///
/// # Examples
///
/// ```
/// use vaultmind_core::extract_inline_hashtags;
///
/// let tags = extract_inline_hashtags("Dinner idea #cooking and #recipes/pasta");
/// assert!(tags.contains("#cooking"));
/// assert!(tags.contains("#recipes/pasta"));
/// ```
pub fn extract_inline_hashtags(content: &str) -> BTreeSet<String> {
    let stripped = CODE_BLOCK.replace_all(content, "");
    let stripped = INLINE_CODE.replace_all(&stripped, "");
    let stripped = remove_headings(&stripped);
    let stripped = MARKDOWN_LINK.replace_all(&stripped, "$1");
    let stripped = WIKI_LINK.replace_all(&stripped, "");
    let stripped = URL.replace_all(&stripped, "");

    HASHTAG
        .captures_iter(&stripped)
        .filter_map(|cap| cap.get(1))
        .map(|m| format!("#{}", m.as_str().trim_end_matches('/')))
        .collect()
}

/// Drop lines that are markdown headings (`#` run followed by space or EOL).
fn remove_headings(content: &str) -> String {
    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            if !trimmed.starts_with('#') {
                return true;
            }
            let after = trimmed.trim_start_matches('#');
            !(after.is_empty() || after.starts_with(' '))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
