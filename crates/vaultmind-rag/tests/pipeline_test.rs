//! End-to-end query behavior against a scripted backend.

use std::sync::Arc;

use vaultmind_core::defaults::{
    MAX_RELATED_NOTES, MAX_RETRIEVED_NOTES, NOTE_CONTENT_BUDGET, QUOTA_ADVISORY,
};
use vaultmind_core::{Note, NoteIndex};
use vaultmind_inference::mock::{MockFailure, MockGenerationBackend};
use vaultmind_inference::FallbackBackend;
use vaultmind_rag::{
    resolve, Assistant, QueryRequest, RetrievalStage, Retriever, ScopeKind,
};

/// Marker present only in the retrieval prompt.
const RETRIEVAL_PROMPT: &str = "You are a retrieval assistant";
/// Marker present only in the final prompt.
const FINAL_PROMPT: &str = "USER REQUEST:";

fn vault() -> NoteIndex {
    NoteIndex::new(vec![
        Note::new("Popcorn Recipe", "Cooking/Popcorn Recipe.md", "Heat oil. ".repeat(500))
            .with_tags(["#snack"]),
        Note::new("Pasta Carbonara", "Cooking/Pasta Carbonara.md", "Eggs, guanciale.")
            .with_tags(["#dinner"]),
        Note::new("Corn Maze", "Garden/Corn Maze.md", "A fall activity."),
        Note::new("Cuisine", "Cuisine.md", "Cooking in general."),
        Note::new("MOC_Food", "MOC_Food.md", "[[Popcorn Recipe]] [[Pasta Carbonara]]"),
    ])
}

fn assistant(mock: &MockGenerationBackend) -> Assistant {
    Assistant::new(Arc::new(mock.clone()))
}

#[tokio::test]
async fn test_retrieved_titles_are_always_candidates() {
    let mock = MockGenerationBackend::new()
        .with_response_mapping(
            RETRIEVAL_PROMPT,
            r#"["Imaginary Note", "Corn Maze", "Pasta Carbonara", "MOC_Nowhere"]"#,
        )
        .with_response_mapping(FINAL_PROMPT, "Boil the pasta.");

    let outcome = assistant(&mock)
        .ask(&vault(), QueryRequest::new("@Folder/Cooking how do I cook pasta"))
        .await
        .unwrap();

    // Corn Maze exists but is outside the folder scope.
    assert_eq!(outcome.retrieved_titles, vec!["Pasta Carbonara"]);
    assert_eq!(outcome.retrieval_stage, RetrievalStage::Semantic);
    assert_eq!(outcome.scope_description, "folder \"Cooking\"");
}

#[tokio::test]
async fn test_retrieval_is_bounded() {
    let mock = MockGenerationBackend::new()
        .with_response_mapping(
            RETRIEVAL_PROMPT,
            r#"["Popcorn Recipe", "Pasta Carbonara", "Corn Maze", "Cuisine", "MOC_Food"]"#,
        )
        .with_response_mapping(FINAL_PROMPT, "ok");
    let index = vault();

    let result = Retriever::new(Arc::new(mock.clone()))
        .retrieve("tell me everything about food", index.notes())
        .await;

    assert_eq!(result.notes.len(), MAX_RETRIEVED_NOTES);
    assert!(result
        .notes
        .iter()
        .all(|n| n.body.chars().count() <= NOTE_CONTENT_BUDGET));
    assert_eq!(result.notes[0].body.chars().count(), NOTE_CONTENT_BUDGET);
}

#[tokio::test]
async fn test_related_notes_bounded_and_validated() {
    let response = "Popcorn is a snack made from [[Corn Maze]] corn and [[Fake]].\n\n\
### Related Notes\n\
- [[MOC_Food]]\n- [[Popcorn Recipe]]\n- [[Ghost]]\n- [[Cuisine]]\n\
- [[Corn Maze]]\n- [[Pasta Carbonara]]\n- [[Popcorn Recipe]]\n";
    let mock = MockGenerationBackend::new()
        .with_response_mapping(RETRIEVAL_PROMPT, "[]")
        .with_response_mapping(FINAL_PROMPT, response);

    let outcome = assistant(&mock)
        .ask(&vault(), QueryRequest::new("what is popcorn"))
        .await
        .unwrap();

    assert_eq!(
        outcome.inline_links,
        vec![
            "Corn Maze",
            "MOC_Food",
            "Popcorn Recipe",
            "Cuisine",
            "Pasta Carbonara"
        ]
    );
    assert_eq!(
        outcome.related_notes,
        vec![
            "MOC_Food",
            "Popcorn Recipe",
            "Cuisine",
            "Corn Maze",
            "Pasta Carbonara"
        ]
    );
    assert!(outcome.related_notes.len() <= MAX_RELATED_NOTES);
}

#[tokio::test]
async fn test_keyword_fallback_is_deterministic() {
    let index = NoteIndex::new(vec![
        Note::new("Bread Basics", "a.md", ""),
        Note::new("Sourdough Bread", "b.md", ""),
        Note::new("Flatbread", "c.md", ""),
        Note::new("Bread", "d.md", ""),
    ]);
    let mock = MockGenerationBackend::new().with_fixed_response("Nothing relevant, sorry.");
    let retriever = Retriever::new(Arc::new(mock));

    let first = retriever.retrieve("best bread recipe", index.notes()).await;
    assert_eq!(first.stage, RetrievalStage::Keyword);
    assert_eq!(first.titles(), vec!["Bread", "Bread Basics", "Sourdough Bread"]);
    for _ in 0..3 {
        let again = retriever.retrieve("best bread recipe", index.notes()).await;
        assert_eq!(again.titles(), first.titles());
    }
}

#[test]
fn test_folder_alias_narrows_scope() {
    let index = vault();
    let scope = resolve("@Dossier/Cooking find pasta", &index, None);
    assert_eq!(scope.cleaned_query, "find pasta");
    assert_eq!(scope.scope.as_ref().map(|s| s.kind), Some(ScopeKind::Folder));
    assert!(scope.candidates.iter().all(|n| n.path.starts_with("Cooking")));
    assert_eq!(scope.candidate_titles(), vec!["Popcorn Recipe", "Pasta Carbonara"]);
}

#[tokio::test]
async fn test_trivial_query_skips_retrieval() {
    let mock = MockGenerationBackend::new().with_fixed_response("Hi there!");
    let outcome = assistant(&mock)
        .ask(&vault(), QueryRequest::new("hi"))
        .await
        .unwrap();

    assert!(outcome.retrieved_titles.is_empty());
    assert_eq!(mock.generate_call_count(), 1);
    assert!(mock.get_calls()[0].prompt.contains(FINAL_PROMPT));
}

#[tokio::test]
async fn test_threshold_uses_query_without_mentions() {
    let mock = MockGenerationBackend::new().with_fixed_response("ok");
    assistant(&mock)
        .ask(&vault(), QueryRequest::new("@Folder/Cooking pasta"))
        .await
        .unwrap();
    // "pasta" is five characters once the mention is removed.
    assert_eq!(mock.generate_call_count(), 1);
}

#[tokio::test]
async fn test_popcorn_keyword_example() {
    let candidates = vec![
        Note::new("Popcorn Recipe", "p.md", ""),
        Note::new("Corn Maze", "m.md", ""),
        Note::new("Cuisine", "c.md", ""),
    ];
    let mock = MockGenerationBackend::new().with_fixed_response("[]");
    let result = Retriever::new(Arc::new(mock))
        .retrieve("I love popcorn", &candidates)
        .await;
    assert_eq!(result.titles(), vec!["Popcorn Recipe"]);
}

#[tokio::test]
async fn test_retrieval_failure_degrades_to_keywords() {
    // First call (retrieval) fails, the final generation succeeds.
    let mock = MockGenerationBackend::new()
        .with_fixed_response("Popcorn needs oil.")
        .with_failures(MockFailure::Transport, 1);

    let outcome = assistant(&mock)
        .ask(&vault(), QueryRequest::new("I love popcorn"))
        .await
        .unwrap();

    assert_eq!(outcome.response, "Popcorn needs oil.");
    assert_eq!(outcome.retrieval_stage, RetrievalStage::Keyword);
    assert_eq!(outcome.retrieved_titles, vec!["Popcorn Recipe"]);
    assert_eq!(mock.generate_call_count(), 2);
    assert!(outcome.prompt.contains("--- Note: Popcorn Recipe ---"));
}

#[tokio::test]
async fn test_quota_advisory_is_a_normal_answer() {
    let exhausted = MockGenerationBackend::new().with_failure(MockFailure::RateLimited);
    let backend = FallbackBackend::new(Box::new(exhausted.clone()))
        .with_fallback(Box::new(exhausted.clone()));
    let assistant = Assistant::new(Arc::new(backend));

    let outcome = assistant
        .ask(&vault(), QueryRequest::new("I love popcorn"))
        .await
        .unwrap();
    assert_eq!(outcome.response, QUOTA_ADVISORY);
    assert!(outcome.related_notes.is_empty());
}

#[tokio::test]
async fn test_tag_scope_and_prompt_titles() {
    let mock = MockGenerationBackend::new()
        .with_response_mapping(RETRIEVAL_PROMPT, r#"["Pasta Carbonara"]"#)
        .with_response_mapping(FINAL_PROMPT, "Dinner idea.");

    let outcome = assistant(&mock)
        .ask(&vault(), QueryRequest::new("@Tag:#dinner what should I cook"))
        .await
        .unwrap();

    assert_eq!(outcome.scope_description, "notes with tag #dinner");
    assert!(outcome
        .prompt
        .contains("LIST OF ALL EXISTING NOTES (JSON):\n[\"Pasta Carbonara\"]"));
    assert!(outcome.prompt.contains("\"@Tag:#dinner what should I cook\""));

    let retrieval_call = &mock.get_calls()[0];
    assert!(retrieval_call.prompt.contains("USER QUERY: \"what should I cook\""));
}

#[tokio::test]
async fn test_link_suggestions_only_name_existing_notes() {
    let mock = MockGenerationBackend::new().with_fixed_response(
        r#"[{"originalText": "popcorn", "noteTitle": "Popcorn Recipe"},
            {"originalText": "maze", "noteTitle": "Maze Theory"}]"#,
    );
    let index = vault();
    let suggestions = assistant(&mock)
        .suggest_links(&index, "I ate popcorn in the maze")
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 1);
    assert!(suggestions.iter().all(|s| index.contains(&s.note_title)));
}

#[tokio::test]
async fn test_synthesis_through_assistant() {
    let mock = MockGenerationBackend::new().with_fixed_response("Food cluster.");
    let note = assistant(&mock)
        .synthesize(&vault(), "MOC_Food")
        .await
        .unwrap();
    assert_eq!(note.file_name, "Graph Synthesis - MOC_Food.md");
    assert!(note.content.contains("- [[Popcorn Recipe]]\n- [[Pasta Carbonara]]"));
}
