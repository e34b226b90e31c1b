//! Structured extraction from free-text model output.
//!
//! Models asked for "only a JSON array" routinely wrap it in prose or code
//! fences. Extraction runs in two explicit stages:
//!
//! 1. [`find_json_array`] locates the bracket-delimited span (first `[` to the
//!    last `]`, across lines).
//! 2. [`parse_json_array`] deserializes that span against a typed schema and
//!    returns a tagged [`JsonArrayParse`] instead of an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static JSON_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// Outcome of parsing a JSON array out of model output.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonArrayParse<T> {
    /// A span was found and matched the schema.
    Parsed(Vec<T>),
    /// No bracket-delimited span in the text.
    NoArray,
    /// A span was found but did not deserialize.
    Malformed(String),
}

impl<T> JsonArrayParse<T> {
    /// Parsed items, or an empty list for any failure.
    pub fn into_items(self) -> Vec<T> {
        match self {
            JsonArrayParse::Parsed(items) => items,
            JsonArrayParse::NoArray | JsonArrayParse::Malformed(_) => Vec::new(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, JsonArrayParse::Parsed(_))
    }
}

/// Locate the outermost bracket-delimited span in `text`.
pub fn find_json_array(text: &str) -> Option<&str> {
    JSON_ARRAY.find(text).map(|m| m.as_str())
}

/// Locate and deserialize a JSON array of `T` from `text`.
pub fn parse_json_array<T: DeserializeOwned>(text: &str) -> JsonArrayParse<T> {
    let Some(span) = find_json_array(text) else {
        return JsonArrayParse::NoArray;
    };
    match serde_json::from_str::<Vec<T>>(span) {
        Ok(items) => JsonArrayParse::Parsed(items),
        Err(e) => JsonArrayParse::Malformed(e.to_string()),
    }
}
