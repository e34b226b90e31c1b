//! Graph synthesis: one note plus everything linked to or from it.

use chrono::{DateTime, Local};
use tracing::{info, instrument};

use vaultmind_core::defaults::{SYNTHESIS_MAX_NOTES, SYNTHESIS_NOTE_BUDGET};
use vaultmind_core::{truncate_chars, Error, GenerationBackend, Note, NoteIndex, Result};

/// A synthesis ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisNote {
    pub file_name: String,
    pub content: String,
}

pub fn synthesis_file_name(central_title: &str) -> String {
    format!("Graph Synthesis - {central_title}.md")
}

/// Prompt over the central note and the first [`SYNTHESIS_MAX_NOTES`]
/// connected notes, each cut to [`SYNTHESIS_NOTE_BUDGET`] characters.
pub fn synthesis_prompt(central: &Note, connected: &[&Note]) -> String {
    let read: Vec<&Note> = connected.iter().copied().take(SYNTHESIS_MAX_NOTES).collect();
    let context: String = read
        .iter()
        .map(|n| {
            format!(
                "\n--- Connected Note: {} ---\n{}\n",
                n.title,
                truncate_chars(&n.body, SYNTHESIS_NOTE_BUDGET)
            )
        })
        .collect();

    format!(
        r#"
You are a knowledge synthesis expert.

CENTRAL NOTE: "{title}"
Content:
{body}

CONNECTED NOTES ({count} notes linked to/from this central note):
{context}

TASK:
Generate a comprehensive synthesis that explains the global concept represented by this note and its network.
1. What is the central theme?
2. How do the connected notes relate to it?
3. What are the key insights from this knowledge cluster?
4. Are there any patterns or emergent ideas?

Write your synthesis in a clear, structured format using Markdown.
"#,
        title = central.title,
        body = central.body,
        count = read.len(),
    )
}

/// Render the saved note. Every connected note is listed, including those
/// beyond the prompt limit.
pub fn synthesis_note(
    central_title: &str,
    synthesis: &str,
    connected: &[&Note],
    generated: DateTime<Local>,
) -> SynthesisNote {
    let listing = connected
        .iter()
        .map(|n| format!("- [[{}]]", n.title))
        .collect::<Vec<_>>()
        .join("\n");
    let content = format!(
        "# Graph Synthesis: {central_title}\n\n**Generated:** {generated}\n**Central Note:** [[{central_title}]]\n**Connected Notes:** {count}\n\n---\n\n{synthesis}\n\n---\n\n## Connected Notes\n{listing}\n",
        generated = generated.format("%Y-%m-%d %H:%M"),
        count = connected.len(),
    );
    SynthesisNote {
        file_name: synthesis_file_name(central_title),
        content,
    }
}

/// Synthesize the network around `title`.
#[instrument(skip(backend, index), fields(subsystem = "rag", component = "synthesis", op = "synthesize"))]
pub async fn synthesize(
    backend: &dyn GenerationBackend,
    index: &NoteIndex,
    title: &str,
) -> Result<SynthesisNote> {
    let central = index
        .get(title)
        .ok_or_else(|| Error::NotFound(format!("note \"{title}\"")))?;
    let connected = index.connected(title);
    if connected.is_empty() {
        return Err(Error::InvalidInput(format!(
            "note \"{title}\" has no connected notes"
        )));
    }

    let prompt = synthesis_prompt(central, &connected);
    let synthesis = backend.generate(&prompt).await?;

    info!(
        connected_count = connected.len(),
        model = %backend.model_name(),
        "Graph synthesis generated"
    );
    Ok(synthesis_note(title, &synthesis, &connected, Local::now()))
}
