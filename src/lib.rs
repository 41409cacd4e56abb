//! Personal notes grouped into books, stored in a single JSON file.

pub mod config;
pub mod logging;
pub mod storage;

pub use storage::{Filter, Note, NoteChanges, NoteError, NoteFields, NoteRecord, NotesRepo};
