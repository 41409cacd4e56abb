//! On-disk shape of a note and the string conversions at the storage boundary.
//!
//! Every value is written as a string: ids in decimal, timestamps as RFC 3339
//! in UTC with as many fractional digits as the value needs, so a save/load
//! cycle reproduces the in-memory note exactly.

use super::error::{NoteError, Result};
use super::note::{Note, NoteFields};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Accepted alongside RFC 3339: `2024-01-31 08:15:00` with optional fraction.
const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub book: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub archived_at: Option<String>,
}

impl TryFrom<NoteRecord> for Note {
    type Error = NoteError;

    fn try_from(record: NoteRecord) -> Result<Self> {
        let id = record.id.ok_or(NoteError::MissingField("id"))?;
        Note::new(NoteFields {
            id: Some(parse_id(&id)?),
            book: record.book,
            content: record.content,
            created_at: record.created_at,
            updated_at: record.updated_at,
            archived_at: record.archived_at,
        })
    }
}

pub fn parse_id(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| NoteError::InvalidId(raw.to_string()))
}

pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
        Err(source) => NaiveDateTime::parse_from_str(trimmed, NAIVE_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|_| NoteError::InvalidTimestamp {
                field,
                value: raw.to_string(),
                source,
            }),
    }
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// Hand-edited stores sometimes carry `"id": 3` instead of `"id": "3"`.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_offset_as_utc() {
        let parsed = parse_timestamp("created_at", "2024-05-01T12:00:00-04:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2024-05-01T16:00:00Z");
    }

    #[test]
    fn parses_naive_space_separated_form() {
        let whole = parse_timestamp("created_at", "2024-05-01 12:00:00").unwrap();
        assert_eq!(format_timestamp(&whole), "2024-05-01T12:00:00Z");

        let fractional = parse_timestamp("created_at", "2024-05-01 12:00:00.123456").unwrap();
        assert_eq!(format_timestamp(&fractional), "2024-05-01T12:00:00.123456Z");
    }

    #[test]
    fn formatting_keeps_nanoseconds() {
        let raw = "2024-05-01T12:00:00.123456789Z";
        let parsed = parse_timestamp("updated_at", raw).unwrap();
        assert_eq!(format_timestamp(&parsed), raw);
    }

    #[test]
    fn rejects_garbage_timestamps() {
        let err = parse_timestamp("archived_at", "31/12/2024").unwrap_err();
        assert!(matches!(
            err,
            NoteError::InvalidTimestamp {
                field: "archived_at",
                ..
            }
        ));
    }

    #[test]
    fn parse_id_trims_and_rejects_non_decimal() {
        assert_eq!(parse_id(" 42\n").unwrap(), 42);
        assert!(matches!(parse_id("-1"), Err(NoteError::InvalidId(_))));
        assert!(matches!(parse_id(""), Err(NoteError::InvalidId(_))));
    }

    #[test]
    fn missing_keys_deserialize_as_none() {
        let record: NoteRecord = serde_json::from_str(r#"{"book": "work"}"#).unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.book.as_deref(), Some("work"));

        let err = Note::try_from(record).unwrap_err();
        assert!(matches!(err, NoteError::MissingField("id")));
    }

    #[test]
    fn numeric_ids_are_accepted() {
        let record: NoteRecord =
            serde_json::from_str(r#"{"id": 9, "book": "work", "archived_at": ""}"#).unwrap();
        let note = Note::try_from(record).unwrap();
        assert_eq!(note.id, 9);
        assert!(!note.is_archived());
    }

    #[test]
    fn record_survives_json() {
        let record = NoteRecord {
            id: Some("1".into()),
            book: Some("work".into()),
            content: Some("buy milk".into()),
            created_at: Some("2024-01-01T00:00:00Z".into()),
            updated_at: Some("2024-01-01T00:00:00Z".into()),
            archived_at: Some(String::new()),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""archived_at":"""#));
        let back: NoteRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
