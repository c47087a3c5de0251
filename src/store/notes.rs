//! Note store: an unbounded, process-lifetime mapping of id to text.
//!
//! Ids are assigned as `count + 1` and never reused; notes are never updated
//! or removed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Returned by [`render_matches`] when a search finds nothing.
pub const NO_MATCHES: &str = "No matching notes found.";

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: u64,
    pub content: String,
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID {}: {}", self.id, self.content)
    }
}

/// In-memory note store, shared with the note tools.
#[derive(Debug, Default)]
pub struct NoteStore {
    notes: Mutex<BTreeMap<u64, String>>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means a panic elsewhere; the map itself is intact.
    fn notes(&self) -> MutexGuard<'_, BTreeMap<u64, String>> {
        self.notes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Save a note and return its id.
    pub fn save(&self, content: impl Into<String>) -> u64 {
        let mut notes = self.notes();
        let id = notes.len() as u64 + 1;
        notes.insert(id, content.into());
        tracing::debug!(note_id = id, "Saved note");
        id
    }

    /// Every note containing `query`, ignoring case, in id order.
    pub fn find(&self, query: &str) -> Vec<Note> {
        let needle = query.to_lowercase();
        self.notes()
            .iter()
            .filter(|(_, content)| content.to_lowercase().contains(&needle))
            .map(|(id, content)| Note {
                id: *id,
                content: content.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.notes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render search results one per line, or [`NO_MATCHES`] when empty.
pub fn render_matches(matches: &[Note]) -> String {
    if matches.is_empty() {
        return NO_MATCHES.to_string();
    }
    matches
        .iter()
        .map(Note::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
