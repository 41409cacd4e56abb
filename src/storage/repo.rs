use super::error::{NoteError, Result};
use super::note::{Note, NoteChanges, NoteFields};
use super::record::{self, NoteRecord};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Lookup criteria shared by [`NotesRepo::find`] and [`NotesRepo::archive`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub book: Option<String>,
    pub id: Option<u64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(mut self, book: impl Into<String>) -> Self {
        self.book = Some(book.into());
        self
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Build from string-keyed parameters (`"book"`, `"id"`). The id is
    /// coerced to an integer; other keys are ignored.
    pub fn from_params<I, K, V>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Filter::default();
        for (key, value) in params {
            match key.as_ref() {
                "book" => filter.book = Some(value.as_ref().to_string()),
                "id" => filter.id = Some(record::parse_id(value.as_ref())?),
                _ => {}
            }
        }
        Ok(filter)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.id, &self.book) {
            (Some(id), Some(book)) => write!(f, "id={id} book={book:?}"),
            (Some(id), None) => write!(f, "id={id}"),
            (None, Some(book)) => write!(f, "book={book:?}"),
            (None, None) => write!(f, "any active note"),
        }
    }
}

/// Notes stored in a single JSON file, fully loaded in memory.
///
/// Every mutation backs up the previous file to `<path>~`, rewrites the file,
/// and reloads from what was written.
#[derive(Debug)]
pub struct NotesRepo {
    path: PathBuf,
    notes: Vec<Note>,
}

impl NotesRepo {
    /// Open the store at `path`, creating an empty file if there is none.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            std::fs::File::create(&path).map_err(|e| NoteError::io(&path, e))?;
            log::info!("created empty note store at {}", path.display());
        }

        let notes = load(&path)?;
        log::debug!("loaded {} notes from {}", notes.len(), path.display());
        Ok(NotesRepo { path, notes })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file holding the previous generation of the store.
    pub fn backup_path(&self) -> PathBuf {
        backup_path_for(&self.path)
    }

    /// Active notes, optionally limited to one book, oldest first.
    pub fn find_all(&self, book: Option<&str>) -> Vec<&Note> {
        self.active_indices(book)
            .into_iter()
            .map(|index| &self.notes[index])
            .collect()
    }

    /// First active note matching the filter. Archived notes are never
    /// returned, not even when asked for by id.
    pub fn find(&self, filter: &Filter) -> Option<&Note> {
        self.find_index(filter).map(|index| &self.notes[index])
    }

    /// Create a new note with the next free id
    pub fn create(&mut self, fields: NoteFields) -> Result<Note> {
        let id = self.next_id();
        let note = Note::new(NoteFields {
            id: Some(id),
            ..fields
        })?;
        log::info!("creating note {} in book {:?}", id, note.book);

        self.notes.push(note);
        let index = self.notes.len() - 1;
        self.persist()?;
        Ok(self.notes[index].clone())
    }

    /// Update an active note's book and/or content
    pub fn update(&mut self, id: u64, changes: &NoteChanges) -> Result<Note> {
        let index = self.position(&Filter::new().id(id))?;
        if self.notes[index].update(changes) {
            log::info!("updated note {}", id);
        } else {
            log::debug!("update of note {} carried no changes", id);
        }

        self.persist()?;
        Ok(self.notes[index].clone())
    }

    /// Archive the first active note matching the filter
    pub fn archive(&mut self, filter: &Filter) -> Result<Note> {
        let index = self.position(filter)?;
        self.notes[index].archive();
        log::info!("archived note {}", self.notes[index].id);

        self.persist()?;
        Ok(self.notes[index].clone())
    }

    fn next_id(&self) -> u64 {
        self.notes.iter().map(|note| note.id).max().unwrap_or(0) + 1
    }

    // Storage positions of active notes, ordered by creation time. Reloading
    // keeps storage order, so these stay valid across `persist`.
    fn active_indices(&self, book: Option<&str>) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .notes
            .iter()
            .enumerate()
            .filter(|(_, note)| !note.is_archived())
            .filter(|(_, note)| book.is_none_or(|book| note.book == book))
            .map(|(index, _)| index)
            .collect();
        indices.sort_by_key(|&index| self.notes[index].created_at);
        indices
    }

    fn find_index(&self, filter: &Filter) -> Option<usize> {
        self.active_indices(filter.book.as_deref())
            .into_iter()
            .find(|&index| filter.id.is_none_or(|id| self.notes[index].id == id))
    }

    fn position(&self, filter: &Filter) -> Result<usize> {
        self.find_index(filter)
            .ok_or_else(|| NoteError::NotFound(filter.to_string()))
    }

    fn persist(&mut self) -> Result<()> {
        if self.path.exists() {
            let backup = self.backup_path();
            std::fs::copy(&self.path, &backup).map_err(|e| NoteError::io(&backup, e))?;
        }

        let records: Vec<NoteRecord> = self.notes.iter().map(Note::to_record).collect();
        let json = serde_json::to_string_pretty(&records).map_err(NoteError::Encode)?;
        std::fs::write(&self.path, json).map_err(|e| NoteError::io(&self.path, e))?;

        self.notes = load(&self.path)?;
        log::debug!("saved {} notes to {}", self.notes.len(), self.path.display());
        Ok(())
    }
}

fn load(path: &Path) -> Result<Vec<Note>> {
    let content = std::fs::read_to_string(path).map_err(|e| NoteError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let records: Vec<NoteRecord> =
        serde_json::from_str(&content).map_err(|source| NoteError::MalformedStore {
            path: path.to_path_buf(),
            source,
        })?;
    records.into_iter().map(Note::try_from).collect()
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut backup = OsString::from(path.as_os_str());
    backup.push("~");
    PathBuf::from(backup)
}
