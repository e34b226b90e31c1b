//! vaultmind: command-line assistant over a markdown vault.
//!
//! Environment variables:
//!   RUST_LOG   - standard env filter (default: "vaultmind=info")
//!   LOG_FORMAT - "text" (default) or "json", overridden by --log-format
//!
//! Inference settings come from the config file (`--config`, or
//! `~/.config/vaultmind/config.toml`) or from `VAULTMIND_*` variables. A
//! `.env` file in the working directory is loaded first.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vaultmind_cli::{AppConfig, Vault};
use vaultmind_core::{Note, NoteIndex};
use vaultmind_rag::{
    apply_link_suggestions, moc_body, note_file_name, render_note_template, resolve,
    template_date, Assistant, CompletionSession, QueryRequest,
};

#[derive(Parser)]
#[command(name = "vaultmind")]
#[command(author, version, about = "Retrieval-augmented assistant for markdown vaults")]
#[command(propagate_version = true)]
struct Cli {
    /// Vault root directory
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Config file (default: ~/.config/vaultmind/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Note treated as open in the editor (vault-relative path)
    #[arg(long, global = true)]
    active: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question; supports @CurrentNote, @Folder/path and @Tag:#tag
    Ask {
        /// The query
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Do not send the active note as context
        #[arg(long)]
        no_context: bool,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,

        /// Save the answer as a new note using the note template
        #[arg(long)]
        save: bool,
    },

    /// Show how a query's mentions narrow the vault, without calling a model
    Scope {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Suggest links from a line of text to existing notes
    SuggestLinks {
        /// Line to analyze
        line: String,

        /// Print the line with every suggestion applied
        #[arg(long)]
        apply: bool,
    },

    /// Split a note into atomic notes
    Atomize {
        /// Note to split (vault-relative path)
        note: PathBuf,

        /// Create the atomic notes in the vault
        #[arg(long)]
        create: bool,

        /// Replace the original note with a map of content (requires --create)
        #[arg(long, requires = "create")]
        moc: bool,
    },

    /// Synthesize a note and everything linked to or from it
    Synthesize {
        /// Title of the central note
        title: String,

        /// Save the synthesis in the vault
        #[arg(long)]
        save: bool,
    },

    /// Complete text at a cursor position
    Complete {
        /// File holding the text (reads stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Cursor position in characters (default: end of text)
        #[arg(long)]
        cursor: Option<usize>,
    },

    /// Send raw text to the model
    Generate {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(flag: Option<LogFormat>) {
    let format = flag.unwrap_or_else(|| match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => LogFormat::Json,
        _ => LogFormat::Text,
    });

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vaultmind=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout carries command output only
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let vault = Vault::open(&cli.vault)?;
    let active = match &cli.active {
        Some(path) => Some(
            vault
                .read_note(path)
                .with_context(|| format!("reading active note {}", path.display()))?,
        ),
        None => None,
    };

    // Scope inspection needs no backend.
    if let Commands::Scope { query } = &cli.command {
        let index = NoteIndex::from_source(&vault);
        return cmd_scope(&index, &query.join(" "), active.as_ref());
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    config.inference.validate()?;
    let backend = config.inference.build_backend()?;
    info!(
        backend = %config.inference.default,
        model = %backend.model_name(),
        "Backend ready"
    );
    let assistant = Assistant::with_settings(Arc::from(backend), config.assistant);

    match cli.command {
        Commands::Ask {
            query,
            no_context,
            json,
            save,
        } => cmd_ask(&assistant, &vault, active, &query.join(" "), !no_context, json, save).await,
        Commands::Scope { .. } => Ok(()),
        Commands::SuggestLinks { line, apply } => {
            cmd_suggest_links(&assistant, &vault, &line, apply).await
        }
        Commands::Atomize { note, create, moc } => {
            cmd_atomize(&assistant, &vault, &note, create, moc).await
        }
        Commands::Synthesize { title, save } => {
            cmd_synthesize(&assistant, &vault, &title, save).await
        }
        Commands::Complete { file, cursor } => cmd_complete(&assistant, file.as_deref(), cursor).await,
        Commands::Generate { text } => {
            println!("{}", assistant.generate(&text.join(" ")).await?);
            Ok(())
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn cmd_ask(
    assistant: &Assistant,
    vault: &Vault,
    active: Option<Note>,
    query: &str,
    include_active: bool,
    json: bool,
    save: bool,
) -> Result<()> {
    let index = NoteIndex::from_source(vault);
    let mut request = QueryRequest::new(query).include_active_note(include_active);
    if let Some(note) = active {
        request = request.with_active_note(note);
    }

    let outcome = assistant.ask(&index, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.response);
        eprintln!();
        eprintln!("scope: {}", outcome.scope_description);
        if !outcome.retrieved_titles.is_empty() {
            eprintln!(
                "context ({}): {}",
                outcome.retrieval_stage,
                outcome.retrieved_titles.join(", ")
            );
        }
        if !outcome.related_notes.is_empty() {
            eprintln!("related: {}", outcome.related_notes.join(", "));
        }
    }

    if save {
        let now = Local::now();
        let content = render_note_template(
            &assistant.settings().note_template,
            &outcome.response,
            &template_date(now),
        );
        let path = vault.create_note(&note_file_name(now), &content)?;
        eprintln!("saved: {}", path.display());
    }
    Ok(())
}

fn cmd_scope(index: &NoteIndex, query: &str, active: Option<&Note>) -> Result<()> {
    let scope = resolve(query, index, active);
    println!("scope: {}", scope.description);
    println!("query: {}", scope.cleaned_query);
    for mention in &scope.mentions {
        let recognized = if mention.scope().is_some() { "" } else { " (ignored)" };
        println!("mention: @{}{}", mention.word, recognized);
    }
    println!("candidates ({}):", scope.candidates.len());
    for note in &scope.candidates {
        println!("  {}", note.title);
    }
    Ok(())
}

async fn cmd_suggest_links(
    assistant: &Assistant,
    vault: &Vault,
    line: &str,
    apply: bool,
) -> Result<()> {
    let index = NoteIndex::from_source(vault);
    let suggestions = assistant.suggest_links(&index, line).await?;

    if suggestions.is_empty() {
        eprintln!("No link suggestions.");
        return Ok(());
    }
    if apply {
        println!("{}", apply_link_suggestions(line, &suggestions));
    } else {
        for s in &suggestions {
            match &s.context {
                Some(context) => println!("\"{}\" -> [[{}]]  ({})", s.original_text, s.note_title, context),
                None => println!("\"{}\" -> [[{}]]", s.original_text, s.note_title),
            }
        }
    }
    Ok(())
}

async fn cmd_atomize(
    assistant: &Assistant,
    vault: &Vault,
    path: &Path,
    create: bool,
    moc: bool,
) -> Result<()> {
    let note = vault.read_note(path)?;
    let atomic = assistant.atomize(&note.body).await?;
    if atomic.is_empty() {
        eprintln!("No atomic concepts identified.");
        return Ok(());
    }

    if !create {
        for n in &atomic {
            println!("## {}\n{}\n", n.title, n.summary);
        }
        return Ok(());
    }

    let mut created = Vec::new();
    for n in &atomic {
        match vault.create_note(&n.file_name(), &n.content) {
            Ok(_) => created.push(n.title.clone()),
            Err(e) => warn!(title = %n.title, error = %e, "Skipping atomic note"),
        }
    }
    println!("Created {} atomic note(s).", created.len());

    if moc && !created.is_empty() {
        vault.overwrite_note(path, &moc_body(&note.title, &created))?;
        println!("{} is now a map of content.", note.title);
    }
    Ok(())
}

async fn cmd_synthesize(assistant: &Assistant, vault: &Vault, title: &str, save: bool) -> Result<()> {
    let index = NoteIndex::from_source(vault);
    let synthesis = assistant.synthesize(&index, title).await?;
    if save {
        let path = vault.create_note(&synthesis.file_name, &synthesis.content)?;
        eprintln!("saved: {}", path.display());
    } else {
        println!("{}", synthesis.content);
    }
    Ok(())
}

async fn cmd_complete(assistant: &Assistant, file: Option<&Path>, cursor: Option<usize>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if !assistant.settings().autocomplete.enabled {
        bail!("autocomplete is disabled in settings");
    }

    let cursor = cursor.unwrap_or_else(|| text.chars().count());
    let session = CompletionSession::new();
    match assistant.complete(&session, &text, cursor).await {
        Some(suggestion) => println!("{}", suggestion),
        None => eprintln!("No completion."),
    }
    Ok(())
}
