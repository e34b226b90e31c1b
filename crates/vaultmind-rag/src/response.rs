//! Post-processing of generated answers.
//!
//! Both extractors only return titles that exist in the vault; links the
//! model invented are dropped.

use std::collections::HashSet;

use tracing::debug;

use vaultmind_core::defaults::MAX_RELATED_NOTES;
use vaultmind_core::extract_wiki_links;

/// Existing titles linked anywhere in `response`, first occurrence order.
pub fn extract_inline_links<S: AsRef<str>>(response: &str, titles: &[S]) -> Vec<String> {
    let known: HashSet<&str> = titles.iter().map(AsRef::as_ref).collect();
    filter_links(response, &known, usize::MAX)
}

/// Existing titles listed under the related-notes `heading`.
///
/// The section runs from the heading line to the next markdown heading or
/// the end of the response. Returns at most [`MAX_RELATED_NOTES`] titles;
/// an absent heading yields none.
pub fn extract_related_notes<S: AsRef<str>>(
    response: &str,
    heading: &str,
    titles: &[S],
) -> Vec<String> {
    let Some(section) = related_section(response, heading) else {
        return Vec::new();
    };
    let known: HashSet<&str> = titles.iter().map(AsRef::as_ref).collect();
    let related = filter_links(&section, &known, MAX_RELATED_NOTES);
    debug!(
        subsystem = "rag",
        component = "response",
        result_count = related.len(),
        "Related notes extracted"
    );
    related
}

fn filter_links(text: &str, known: &HashSet<&str>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    extract_wiki_links(text)
        .into_iter()
        .map(|link| link.target)
        .filter(|target| known.contains(target.as_str()))
        .filter(|target| seen.insert(target.clone()))
        .take(limit)
        .collect()
}

fn related_section(response: &str, heading: &str) -> Option<String> {
    let wanted = normalize_heading(heading);
    let mut lines = response.lines();
    lines.by_ref().find(|line| normalize_heading(line) == wanted)?;

    let section: Vec<&str> = lines
        .take_while(|line| !line.trim_start().starts_with('#') || is_tag_line(line))
        .collect();
    Some(section.join("\n"))
}

/// Heading text without markers, trailing colon or case.
fn normalize_heading(line: &str) -> String {
    line.trim()
        .trim_start_matches('#')
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}

/// `#tag` lines are content, not headings.
fn is_tag_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#') && !trimmed.starts_with("# ") && !trimmed.starts_with("##")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLES: &[&str] = &["Popcorn Recipe", "Cuisine", "Corn", "MOC_Food", "A", "B", "C"];

    #[test]
    fn test_inline_links_filtered() {
        let response = "Try [[Popcorn Recipe]] or [[Imaginary]] and [[Cuisine|cooking]].";
        assert_eq!(
            extract_inline_links(response, TITLES),
            vec!["Popcorn Recipe", "Cuisine"]
        );
    }

    #[test]
    fn test_inline_links_deduplicated() {
        let response = "[[Corn]] then [[Corn#History]] again";
        assert_eq!(extract_inline_links(response, TITLES), vec!["Corn"]);
    }

    #[test]
    fn test_related_notes_section() {
        let response = "Body mentions [[A]].\n\n### Related Notes\n- [[MOC_Food]]\n- [[Cuisine]]\n- [[Ghost]]\n";
        assert_eq!(
            extract_related_notes(response, "### Related Notes", TITLES),
            vec!["MOC_Food", "Cuisine"]
        );
    }

    #[test]
    fn test_related_notes_capped_at_five() {
        let response = "### Related Notes\n[[A]], [[B]], [[C]], [[Corn]], [[Cuisine]], [[MOC_Food]]";
        let related = extract_related_notes(response, "### Related Notes", TITLES);
        assert_eq!(related.len(), 5);
        assert_eq!(related[0], "A");
    }

    #[test]
    fn test_related_notes_heading_variants() {
        let response = "answer\n## related notes :\n- [[Corn]]";
        assert_eq!(
            extract_related_notes(response, "### Related Notes", TITLES),
            vec!["Corn"]
        );
        let french = "réponse\n### Notes Liées :\n- [[Cuisine]]";
        assert_eq!(
            extract_related_notes(french, "### Notes Liées :", TITLES),
            vec!["Cuisine"]
        );
    }

    #[test]
    fn test_related_section_stops_at_next_heading() {
        let response = "### Related Notes\n- [[Corn]]\n#food\n## Appendix\n- [[Cuisine]]";
        assert_eq!(
            extract_related_notes(response, "### Related Notes", TITLES),
            vec!["Corn"]
        );
    }

    #[test]
    fn test_missing_heading_yields_nothing() {
        let response = "Just [[Corn]] inline.";
        assert!(extract_related_notes(response, "### Related Notes", TITLES).is_empty());
    }
}
