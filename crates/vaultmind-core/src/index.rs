//! Flattened, title-addressable view over a note collection.
//!
//! A [`NoteIndex`] is built fresh for every query from a [`NoteSource`]
//! snapshot and never mutated afterwards.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::links::extract_wiki_links;
use crate::models::{Note, NoteSummary};
use crate::traits::NoteSource;

/// Read-only index of notes keyed by unique title, in source order.
#[derive(Debug, Clone, Default)]
pub struct NoteIndex {
    notes: Vec<Note>,
    by_title: HashMap<String, usize>,
}

impl NoteIndex {
    /// Build an index, keeping the first note for each title.
    pub fn new(notes: impl IntoIterator<Item = Note>) -> Self {
        let mut index = Self::default();
        for note in notes {
            if index.by_title.contains_key(&note.title) {
                debug!(
                    subsystem = "core",
                    component = "note_index",
                    note_title = %note.title,
                    path = %note.path,
                    "Duplicate title dropped from index"
                );
                continue;
            }
            index.by_title.insert(note.title.clone(), index.notes.len());
            index.notes.push(note);
        }
        index
    }

    /// Build an index from a source; an unavailable source yields an empty index.
    pub fn from_source(source: &dyn NoteSource) -> Self {
        match source.notes() {
            Ok(notes) => Self::new(notes),
            Err(e) => {
                warn!(
                    subsystem = "core",
                    component = "note_index",
                    error = %e,
                    "Note collection unavailable, using empty index"
                );
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// All notes in source order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, title: &str) -> Option<&Note> {
        self.by_title.get(title).map(|&i| &self.notes[i])
    }

    pub fn contains(&self, title: &str) -> bool {
        self.by_title.contains_key(title)
    }

    /// Title/path/tags triples in source order.
    pub fn entries(&self) -> Vec<NoteSummary> {
        self.notes.iter().map(Note::summary).collect()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notes.iter().map(|n| n.title.clone()).collect()
    }

    /// Titles of Map of Content notes.
    pub fn moc_titles(&self) -> Vec<String> {
        self.notes
            .iter()
            .filter(|n| n.is_moc())
            .map(|n| n.title.clone())
            .collect()
    }

    /// Existing notes that `title` links to, de-duplicated, in link order.
    pub fn outgoing_links(&self, title: &str) -> Vec<&Note> {
        let Some(note) = self.get(title) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        extract_wiki_links(&note.body)
            .into_iter()
            .filter(|link| link.target != title && seen.insert(link.target.clone()))
            .filter_map(|link| self.get(&link.target))
            .collect()
    }

    /// Notes whose body links to `title`, in source order.
    pub fn backlinks(&self, title: &str) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.title != title)
            .filter(|n| {
                extract_wiki_links(&n.body)
                    .iter()
                    .any(|link| link.target == title)
            })
            .collect()
    }

    /// Backlinks followed by outgoing links, without duplicates.
    pub fn connected(&self, title: &str) -> Vec<&Note> {
        let mut seen = HashSet::new();
        self.backlinks(title)
            .into_iter()
            .chain(self.outgoing_links(title))
            .filter(|n| seen.insert(n.title.as_str()))
            .collect()
    }
}
