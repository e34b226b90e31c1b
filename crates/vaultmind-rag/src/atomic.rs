//! Decomposition of a long note into atomic notes.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vaultmind_core::defaults::MAX_ATOMIC_NOTES;
use vaultmind_core::{Error, Result};
use vaultmind_inference::{parse_json_array, JsonArrayParse};

/// One self-contained concept extracted from a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicNote {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: String,
}

impl AtomicNote {
    /// File name the note is saved under.
    pub fn file_name(&self) -> String {
        format!("{}.md", self.title)
    }
}

pub fn atomic_notes_prompt(content: &str) -> String {
    format!(
        r###"
You are a Zettelkasten expert. Your task is to decompose a long note into atomic notes.

CURRENT NOTE CONTENT:
"{content}"

TASK:
1. Identify distinct atomic concepts in this text (each concept should be self-contained).
2. For each concept, extract the relevant paragraph(s) from the original text.
3. For each atomic note, create:
   - A clear, descriptive title (filename-friendly, no special chars except underscore and dash)
   - The content structured as follows:
     **First**: The original paragraph(s) extracted verbatim from the text (keep the exact wording)
     **Then**: Add a separator "---"
     **Finally**: Add your enrichment - additional ideas, context, explanations, or related concepts in the SAME LANGUAGE as the original text
   - A brief summary (1-2 sentences)
4. Return a JSON array: [{{ "title": "Note Title", "content": "## Original Text\n[original paragraph]\n\n---\n\n## Enrichment\n[your additions]", "summary": "Brief summary" }}]
5. Aim for 2-5 atomic notes. Do not create more than {MAX_ATOMIC_NOTES}.
6. Each atomic note should be focused on ONE concept or idea.
7. CRITICAL: Write your enrichment in the same language as the original text.
"###
    )
}

/// Whether a model-proposed title can be used as a file name in the vault
/// root: non-empty, not hidden, no path separators or parent references.
fn is_safe_title(title: &str) -> bool {
    let title = title.trim();
    !title.is_empty()
        && !title.starts_with('.')
        && !title.contains("..")
        && !title.contains(&['/', '\\'][..])
}

/// Parse the model's decomposition, keeping at most [`MAX_ATOMIC_NOTES`]
/// notes whose title is usable as a file name.
pub fn parse_atomic_notes(response: &str) -> Result<Vec<AtomicNote>> {
    let parsed = match parse_json_array::<AtomicNote>(response) {
        JsonArrayParse::Parsed(items) => items,
        JsonArrayParse::NoArray => {
            return Err(Error::InvalidInput(
                "Could not parse atomic notes from response".to_string(),
            ))
        }
        JsonArrayParse::Malformed(reason) => {
            warn!(error = %reason, "Atomic notes were malformed");
            return Err(Error::Serialization(reason));
        }
    };

    let notes: Vec<AtomicNote> = parsed
        .into_iter()
        .filter(|n| {
            let safe = is_safe_title(&n.title);
            if !safe && !n.title.trim().is_empty() {
                warn!(title = %n.title, "Dropping atomic note with unusable title");
            }
            safe
        })
        .take(MAX_ATOMIC_NOTES)
        .collect();

    debug!(
        subsystem = "rag",
        component = "atomic",
        result_count = notes.len(),
        "Atomic notes parsed"
    );
    Ok(notes)
}

/// Body that replaces the original note once its atomic notes exist.
pub fn moc_body<S: AsRef<str>>(original_title: &str, created: &[S]) -> String {
    let links = created
        .iter()
        .map(|t| format!("- [[{}]]", t.as_ref()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "# MOC: {original_title}\n\nThis note has been refactored into atomic concepts:\n\n{links}\n\n---\n*Generated by vaultmind*\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_content() {
        let prompt = atomic_notes_prompt("Long note body");
        assert!(prompt.contains("CURRENT NOTE CONTENT:\n\"Long note body\""));
        assert!(prompt.contains("Do not create more than 7."));
    }

    #[test]
    fn test_parse_atomic_notes() {
        let response = r###"```json
[{"title": "Spaced_Repetition", "content": "## Original Text\nReview often", "summary": "Review"},
 {"title": "Active-Recall", "content": "Test yourself"}]
```"###;
        let notes = parse_atomic_notes(response).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].title, "Spaced_Repetition");
        assert_eq!(notes[1].summary, "");
        assert_eq!(notes[1].file_name(), "Active-Recall.md");
    }

    #[test]
    fn test_parse_caps_and_drops_untitled() {
        let mut items: Vec<String> = (0..9)
            .map(|i| format!(r#"{{"title": "N{i}", "content": "c"}}"#))
            .collect();
        items.insert(0, r#"{"title": " ", "content": "c"}"#.to_string());
        let response = format!("[{}]", items.join(","));
        let notes = parse_atomic_notes(&response).unwrap();
        assert_eq!(notes.len(), MAX_ATOMIC_NOTES);
        assert_eq!(notes[0].title, "N0");
    }

    #[test]
    fn test_parse_drops_path_like_titles() {
        let response = r#"[
            {"title": "../escaped", "content": "c"},
            {"title": "nested/note", "content": "c"},
            {"title": "win\\path", "content": "c"},
            {"title": ".hidden", "content": "c"},
            {"title": "Kept_Note", "content": "c"}
        ]"#;
        let notes = parse_atomic_notes(response).unwrap();
        let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Kept_Note"]);
    }

    #[test]
    fn test_parse_without_array_is_error() {
        assert!(matches!(
            parse_atomic_notes("I can't do that"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_moc_body() {
        let body = moc_body("Learning", &["Spaced_Repetition", "Active-Recall"]);
        assert_eq!(
            body,
            "# MOC: Learning\n\nThis note has been refactored into atomic concepts:\n\n- [[Spaced_Repetition]]\n- [[Active-Recall]]\n\n---\n*Generated by vaultmind*\n"
        );
    }
}
