//! Keyword scoring over note titles.
//!
//! The fallback retrieval stage. Deterministic: equal scores keep the
//! candidate order they arrived in.

use vaultmind_core::defaults::EXACT_TITLE_BONUS;

/// A title with its keyword score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredTitle {
    pub title: String,
    pub score: u32,
}

/// Lowercased whitespace-separated words longer than `min_chars` characters.
pub fn extract_keywords(query: &str, min_chars: usize) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|w| w.chars().count() > min_chars)
        .map(str::to_lowercase)
        .collect()
}

/// Score one title: +1 per keyword contained in it, plus the exact-match
/// bonus when a keyword equals the whole title.
pub fn score_title(title: &str, keywords: &[String]) -> u32 {
    let lowered = title.to_lowercase();
    keywords
        .iter()
        .map(|k| {
            let mut score = 0;
            if lowered.contains(k.as_str()) {
                score += 1;
            }
            if lowered == *k {
                score += EXACT_TITLE_BONUS;
            }
            score
        })
        .sum()
}

/// Score every title, drop zero scores and return the best `limit`.
pub fn rank_titles<S: AsRef<str>>(titles: &[S], keywords: &[String], limit: usize) -> Vec<ScoredTitle> {
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredTitle> = titles
        .iter()
        .map(|t| ScoredTitle {
            title: t.as_ref().to_string(),
            score: score_title(t.as_ref(), keywords),
        })
        .filter(|s| s.score > 0)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}
