//! Final prompt assembly.
//!
//! [`PromptAssembler::assemble`] is a pure function of its inputs: the same
//! [`PromptInputs`] always produce the same string.

use vaultmind_core::defaults::{MAX_RELATED_NOTES, RELATED_NOTES_HEADING};
use vaultmind_core::{truncate_chars, Note};

/// The note open in the caller's editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNote {
    pub title: String,
    pub content: String,
}

impl ActiveNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Context block for the prompt, optionally bounded to `max_chars` of content.
    pub fn context_block(&self, max_chars: Option<usize>) -> String {
        let content = match max_chars {
            Some(max) => truncate_chars(&self.content, max),
            None => &self.content,
        };
        format!(
            "\nCONTEXT FROM ACTIVE NOTE \"{}\":\n{}\n",
            self.title, content
        )
    }
}

impl From<&Note> for ActiveNote {
    fn from(note: &Note) -> Self {
        Self::new(note.title.clone(), note.body.clone())
    }
}

/// Everything the final prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub system_prompt: &'a str,
    /// The user's query as typed, mentions included.
    pub user_query: &'a str,
    /// Pre-rendered active note block, included verbatim.
    pub active_note_context: Option<&'a str>,
    /// Retrieved notes with bodies already truncated.
    pub retrieved: &'a [Note],
    pub all_titles: &'a [String],
    pub moc_titles: &'a [String],
}

/// Builds prompts with a fixed section layout.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    related_heading: String,
    max_related: usize,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self {
            related_heading: RELATED_NOTES_HEADING.to_string(),
            max_related: MAX_RELATED_NOTES,
        }
    }
}

impl PromptAssembler {
    pub fn new(related_heading: impl Into<String>) -> Self {
        Self {
            related_heading: related_heading.into(),
            ..Self::default()
        }
    }

    pub fn related_heading(&self) -> &str {
        &self.related_heading
    }

    pub fn max_related(&self) -> usize {
        self.max_related
    }

    /// Labeled block of retrieved note bodies, empty when nothing was retrieved.
    pub fn retrieved_block(retrieved: &[Note]) -> String {
        if retrieved.is_empty() {
            return String::new();
        }
        let mut block = String::from("\nRELEVANT NOTES CONTENT (Found by Smart Retrieval):\n");
        for note in retrieved {
            block.push_str(&format!("--- Note: {} ---\n{}\n...\n", note.title, note.body));
        }
        block
    }

    pub fn assemble(&self, inputs: &PromptInputs<'_>) -> String {
        let active = inputs.active_note_context.unwrap_or("");
        let retrieved = Self::retrieved_block(inputs.retrieved);
        let mocs = to_json(inputs.moc_titles);
        let titles = to_json(inputs.all_titles);
        let heading = &self.related_heading;
        let max_related = self.max_related;

        format!(
            r#"
{system}

USER REQUEST:
"{query}"

{active}

{retrieved}

---
TASK:
1. Answer the user's request above clearly and concisely.
2. **SMART LINKING (CRITICAL)**:
   - I have provided a list of ALL existing notes in this vault below (JSON).
   - **GOAL**: Connect this new note to EXISTING knowledge.
   - **INLINE LINKS**: Only create inline links [[Title]] if a term in your text EXACTLY matches a note title. DO NOT link common words even if they exist as notes.
   - **RELATED NOTES SECTION**: At the very end of your response, add a section called "{heading}" and list **UP TO {max_related}** existing notes from the provided list.
     - **QUALITY OVER QUANTITY**: Only include notes that have a **STRONG** semantic connection (Relevance Score > 8/10).
     - If only 1 or 2 notes are relevant, ONLY list those. Do NOT force {max_related} links if they are not relevant.
     - **MOC PRIORITY**: Check the "LIST OF MOCs" below. If one Map of Content (MOC) is strongly relevant, link the ONE most relevant MOC first.
     - Look for PARENT CONCEPTS or CATEGORIES.
     - Example: If you write about "Popcorn" and the list contains "Cuisine" or "Corn", link them in this section: [[Cuisine]], [[Corn]].

LIST OF MOCs (Map of Content):
{mocs}

LIST OF ALL EXISTING NOTES (JSON):
{titles}
"#,
            system = inputs.system_prompt,
            query = inputs.user_query,
        )
    }
}

fn to_json(titles: &[String]) -> String {
    serde_json::to_string(titles).unwrap_or_else(|_| "[]".to_string())
}
