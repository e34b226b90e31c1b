//! End-to-end assistant operations.
//!
//! [`Assistant::ask`] runs one query: scope resolution, retrieval, prompt
//! assembly, generation and response post-processing. It makes at most two
//! model calls, one after the other. Retrieval problems only reduce context;
//! the error from the final generation call is the only one returned.
//!
//! The other methods wrap the note operations (link suggestions, atomic
//! decomposition, graph synthesis, autocomplete) behind the same backend.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument};

use vaultmind_core::{Error, GenerationBackend, Note, NoteIndex, Result};

use crate::assembler::{ActiveNote, PromptAssembler, PromptInputs};
use crate::atomic::{atomic_notes_prompt, parse_atomic_notes, AtomicNote};
use crate::completion::{request_completion, CompletionSession};
use crate::links::{link_suggestion_prompt, parse_link_suggestions, LinkSuggestion};
use crate::response::{extract_inline_links, extract_related_notes};
use crate::retriever::{RetrievalStage, Retriever};
use crate::scope::resolve;
use crate::settings::AssistantSettings;
use crate::synthesis::{synthesize, SynthesisNote};

// =============================================================================
// REQUEST / OUTCOME
// =============================================================================

/// One user query.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub query: String,
    /// Note open in the caller's editor.
    pub active_note: Option<Note>,
    /// Include the active note as context. `None` uses the settings default.
    pub include_active_note: Option<bool>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_active_note(mut self, note: Note) -> Self {
        self.active_note = Some(note);
        self
    }

    pub fn include_active_note(mut self, include: bool) -> Self {
        self.include_active_note = Some(include);
        self
    }
}

/// Everything produced for one query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// Raw model response, or the quota advisory.
    pub response: String,
    /// The exact prompt sent for generation.
    pub prompt: String,
    pub scope_description: String,
    pub retrieved_titles: Vec<String>,
    pub retrieval_stage: RetrievalStage,
    /// Existing notes linked inline in the response.
    pub inline_links: Vec<String>,
    /// Existing notes listed under the related-notes heading.
    pub related_notes: Vec<String>,
}

// =============================================================================
// ASSISTANT
// =============================================================================

pub struct Assistant {
    backend: Arc<dyn GenerationBackend>,
    retriever: Retriever,
    assembler: PromptAssembler,
    settings: AssistantSettings,
}

impl Assistant {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self::with_settings(backend, AssistantSettings::default())
    }

    pub fn with_settings(backend: Arc<dyn GenerationBackend>, settings: AssistantSettings) -> Self {
        let retriever = Retriever::with_config(Arc::clone(&backend), settings.retrieval.clone());
        let assembler = PromptAssembler::new(settings.related_notes_heading.clone());
        Self {
            backend,
            retriever,
            assembler,
            settings,
        }
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn backend(&self) -> &dyn GenerationBackend {
        self.backend.as_ref()
    }

    /// Answer `request` against `index`.
    #[instrument(skip(self, index, request), fields(
        subsystem = "rag",
        component = "pipeline",
        op = "ask",
        model = %self.backend.model_name(),
    ))]
    pub async fn ask(&self, index: &NoteIndex, request: QueryRequest) -> Result<QueryOutcome> {
        let start = Instant::now();
        if request.query.trim().is_empty() {
            return Err(Error::InvalidInput("query is empty".to_string()));
        }

        let scope = resolve(&request.query, index, request.active_note.as_ref());
        let retrieval = self
            .retriever
            .retrieve(&scope.cleaned_query, &scope.candidates)
            .await;

        let include_active = request
            .include_active_note
            .unwrap_or(self.settings.include_active_note);
        let active_block = match (&request.active_note, include_active) {
            (Some(note), true) => Some(ActiveNote::from(note).context_block(None)),
            _ => None,
        };

        let titles = scope.candidate_titles();
        let mocs = scope.moc_titles();
        let prompt = self.assembler.assemble(&PromptInputs {
            system_prompt: &self.settings.system_prompt,
            user_query: &request.query,
            active_note_context: active_block.as_deref(),
            retrieved: &retrieval.notes,
            all_titles: &titles,
            moc_titles: &mocs,
        });

        let response = self.backend.generate(&prompt).await?;

        let known = index.titles();
        let inline_links = extract_inline_links(&response, &known);
        let related_notes =
            extract_related_notes(&response, self.assembler.related_heading(), &known);

        info!(
            scope = %scope.description,
            candidate_count = scope.candidates.len(),
            retrieval_stage = %retrieval.stage,
            result_count = retrieval.notes.len(),
            prompt_len = prompt.len(),
            response_len = response.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Query answered"
        );

        Ok(QueryOutcome {
            response,
            prompt,
            scope_description: scope.description,
            retrieved_titles: retrieval.titles(),
            retrieval_stage: retrieval.stage,
            inline_links,
            related_notes,
        })
    }

    /// Send `text` to the model as-is.
    pub async fn generate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("text is empty".to_string()));
        }
        self.backend.generate(text).await
    }

    /// Suggest links from `line` to existing notes.
    #[instrument(skip(self, index, line), fields(subsystem = "rag", component = "links", op = "suggest_links"))]
    pub async fn suggest_links(&self, index: &NoteIndex, line: &str) -> Result<Vec<LinkSuggestion>> {
        if line.trim().is_empty() {
            return Err(Error::InvalidInput("line is empty".to_string()));
        }
        let titles = index.titles();
        let response = self
            .backend
            .generate(&link_suggestion_prompt(line, &titles))
            .await?;
        parse_link_suggestions(&response, &titles)
    }

    /// Split `content` into atomic notes.
    #[instrument(skip(self, content), fields(subsystem = "rag", component = "atomic", op = "atomize"))]
    pub async fn atomize(&self, content: &str) -> Result<Vec<AtomicNote>> {
        if content.trim().is_empty() {
            return Err(Error::InvalidInput("note is empty".to_string()));
        }
        let response = self.backend.generate(&atomic_notes_prompt(content)).await?;
        parse_atomic_notes(&response)
    }

    /// Synthesize the link network around `title`.
    pub async fn synthesize(&self, index: &NoteIndex, title: &str) -> Result<SynthesisNote> {
        synthesize(self.backend.as_ref(), index, title).await
    }

    /// Inline completion at character offset `cursor`. `None` when disabled.
    pub async fn complete(
        &self,
        session: &CompletionSession,
        text: &str,
        cursor: usize,
    ) -> Option<String> {
        if !self.settings.autocomplete.enabled {
            return None;
        }
        request_completion(self.backend.as_ref(), session, text, cursor).await
    }
}
