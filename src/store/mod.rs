//! In-memory storage for notes.

pub mod notes;

pub use notes::{NO_MATCHES, Note, NoteStore, render_matches};
