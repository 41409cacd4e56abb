use super::error::{NoteError, Result};
use super::record::{self, NoteRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: u64,
    pub book: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Input bundle for building a note. Timestamps arrive in their string form
/// and are parsed by [`Note::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFields {
    pub id: Option<u64>,
    pub book: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub archived_at: Option<String>,
}

impl NoteFields {
    pub fn new(book: impl Into<String>) -> Self {
        NoteFields {
            book: Some(book.into()),
            ..Default::default()
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Build from a string-keyed parameter map. Unknown keys are ignored.
    pub fn from_params<I, K, V>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut fields = NoteFields::default();
        for (key, value) in params {
            let value = value.as_ref();
            match key.as_ref() {
                "id" => fields.id = Some(record::parse_id(value)?),
                "book" => fields.book = Some(value.to_string()),
                "content" => fields.content = Some(value.to_string()),
                "created_at" => fields.created_at = Some(value.to_string()),
                "updated_at" => fields.updated_at = Some(value.to_string()),
                "archived_at" => fields.archived_at = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(fields)
    }
}

/// Partial update for an existing note. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub book: Option<String>,
    pub content: Option<String>,
}

impl NoteChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(mut self, book: impl Into<String>) -> Self {
        self.book = Some(book.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.book.is_none() && self.content.is_none()
    }

    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut changes = NoteChanges::default();
        for (key, value) in params {
            match key.as_ref() {
                "book" => changes.book = Some(value.as_ref().to_string()),
                "content" => changes.content = Some(value.as_ref().to_string()),
                _ => {}
            }
        }
        changes
    }
}

impl Note {
    /// Build a note from raw fields.
    ///
    /// `id` and `book` are required. Missing timestamps default to now, and an
    /// empty `archived_at` means the note is active.
    pub fn new(fields: NoteFields) -> Result<Self> {
        let id = fields.id.ok_or(NoteError::MissingField("id"))?;
        let book = fields.book.ok_or(NoteError::MissingField("book"))?;
        let now = Utc::now();

        let created_at = match fields.created_at {
            Some(raw) => record::parse_timestamp("created_at", &raw)?,
            None => now,
        };
        let updated_at = match fields.updated_at {
            Some(raw) => record::parse_timestamp("updated_at", &raw)?,
            None => now,
        };
        let archived_at = match fields.archived_at {
            Some(raw) if !raw.is_empty() => {
                Some(record::parse_timestamp("archived_at", &raw)?)
            }
            _ => None,
        };

        Ok(Note {
            id,
            book,
            content: fields.content.unwrap_or_default(),
            created_at,
            updated_at,
            archived_at,
        })
    }

    /// Apply the supplied changes. `updated_at` only moves when something was
    /// supplied; returns whether it did.
    pub fn update(&mut self, changes: &NoteChanges) -> bool {
        if let Some(content) = &changes.content {
            self.content = content.clone();
        }
        if let Some(book) = &changes.book {
            self.book = book.clone();
        }
        if changes.is_empty() {
            return false;
        }
        self.updated_at = Utc::now();
        true
    }

    pub fn archive(&mut self) {
        let now = Utc::now();
        self.archived_at = Some(now);
        self.updated_at = now;
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn to_record(&self) -> NoteRecord {
        NoteRecord {
            id: Some(self.id.to_string()),
            book: Some(self.book.clone()),
            content: Some(self.content.clone()),
            created_at: Some(record::format_timestamp(&self.created_at)),
            updated_at: Some(record::format_timestamp(&self.updated_at)),
            archived_at: Some(
                self.archived_at
                    .as_ref()
                    .map(record::format_timestamp)
                    .unwrap_or_default(),
            ),
        }
    }
}
