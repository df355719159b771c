//! Multi-value columns.
//!
//! List attributes (skills, topics, languages, ...) live in a single TEXT
//! column holding a JSON array. An absent or empty list is stored as NULL and
//! a NULL column decodes back to `None`, never to an empty list, so callers can
//! tell "never set" apart from "set".

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

/// A plain list of strings (skills, topics, benefits, ...).
pub type StringList = Vec<String>;

/// A list of key/value objects, e.g. `{"language": "English", "proficiency": "native"}`.
/// Kept as raw maps so unknown keys survive a round trip.
pub type ObjectList = Vec<Map<String, JsonValue>>;

pub fn encode<T: Serialize>(values: Option<&[T]>) -> Result<Option<String>> {
    match values {
        Some(items) if !items.is_empty() => Ok(Some(serde_json::to_string(items)?)),
        _ => Ok(None),
    }
}

pub fn decode<T: DeserializeOwned>(column: &str, stored: Option<&str>) -> Result<Option<Vec<T>>> {
    match stored.map(str::trim) {
        Some(raw) if !raw.is_empty() => serde_json::from_str(raw).map(Some).map_err(|e| {
            Error::Internal(format!("Stored value of {} is not a JSON array: {}", column, e))
        }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_lists_round_trip() {
        let skills: StringList = vec!["Rust".into(), "SQL".into(), "naïve ünïcödé ✓".into()];
        let stored = encode(Some(skills.as_slice())).unwrap();
        assert_eq!(stored.as_deref(), Some(r#"["Rust","SQL","naïve ünïcödé ✓"]"#));
        let back: Option<StringList> = decode("skills", stored.as_deref()).unwrap();
        assert_eq!(back, Some(skills));
    }

    #[test]
    fn object_lists_keep_every_key() {
        let languages: ObjectList = serde_json::from_value(json!([
            {"language": "English", "proficiency": "native"},
            {"language": "Hindi", "proficiency": "fluent", "certified": true}
        ]))
        .unwrap();
        let stored = encode(Some(languages.as_slice())).unwrap();
        let back: Option<ObjectList> = decode("languages", stored.as_deref()).unwrap();
        assert_eq!(back, Some(languages));
    }

    #[test]
    fn absent_and_empty_encode_to_null() {
        assert_eq!(encode::<String>(None).unwrap(), None);
        assert_eq!(encode::<String>(Some(&[])).unwrap(), None);
    }

    #[test]
    fn null_and_blank_decode_to_none() {
        let none: Option<StringList> = decode("topics", None).unwrap();
        assert_eq!(none, None);
        let blank: Option<StringList> = decode("topics", Some("  ")).unwrap();
        assert_eq!(blank, None);
    }

    #[test]
    fn corrupt_storage_is_an_internal_error() {
        let err = decode::<String>("topics", Some("not json")).unwrap_err();
        assert!(matches!(err, Error::Internal(msg) if msg.contains("topics")));
    }
}
