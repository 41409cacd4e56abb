pub mod error;
pub mod note;
pub mod record;
pub mod repo;

pub use error::{NoteError, Result};
pub use note::{Note, NoteChanges, NoteFields};
pub use record::NoteRecord;
pub use repo::{Filter, NotesRepo};
