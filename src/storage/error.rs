use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NoteError>;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid timestamp for `{field}`: {value:?}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid note id: {0:?}")]
    InvalidId(String),

    #[error("malformed note store {}", .path.display())]
    MalformedStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode note store")]
    Encode(#[source] serde_json::Error),

    #[error("i/o error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("note not found: {0}")]
    NotFound(String),
}

impl NoteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NoteError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for every variant that stems from unparseable input. Failing to
    /// encode on save is not one of them.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            NoteError::InvalidTimestamp { .. }
                | NoteError::InvalidId(_)
                | NoteError::MalformedStore { .. }
        )
    }
}
