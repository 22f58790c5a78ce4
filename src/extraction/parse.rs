//! Parsing of the vision model's free-form reply.
//!
//! The reply may wrap the requested JSON object in prose or code fences.
//! Only the first balanced `{...}` span is parsed, and every field is
//! validated on its own. Malformed replies never fail: they degrade to the
//! default analysis.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{default_genre_hints, MoodAnalysis, DEFAULT_DESCRIPTION, DEFAULT_MOOD};

/// Reasons a reply could not be read as a JSON object.
///
/// Absorbed by [`parse_mood_response`]; never leaves this module.
#[derive(Debug, Error)]
enum ParseError {
    #[error("no balanced JSON object in response")]
    NoObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("JSON value is not an object")]
    NotAnObject,
}

/// Turns a raw vision reply into a well-formed [`MoodAnalysis`].
///
/// If no JSON object can be read, the result is the default analysis with
/// the raw text as description. Otherwise each field falls back on its own.
pub fn parse_mood_response(raw: &str) -> MoodAnalysis {
    let raw = raw.trim();

    match read_object(raw) {
        Ok(object) => analysis_from_object(&object),
        Err(err) => {
            tracing::warn!(error = %err, raw_len = raw.len(), "Vision reply not parseable, using default mood");
            MoodAnalysis::fallback(raw)
        }
    }
}

/// Returns the first balanced `{...}` span of `text`, if any.
///
/// Braces inside JSON string literals are ignored. An opening brace that is
/// never closed is skipped and the scan resumes at the next one.
pub fn find_json_object(text: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(found) = text[from..].find('{') {
        let start = from + found;
        if let Some(len) = balanced_len(&text[start..]) {
            return Some(&text[start..start + len]);
        }
        from = start + 1;
    }
    None
}

/// Length of the balanced object at the start of `text`, which begins with `{`.
fn balanced_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

fn read_object(raw: &str) -> Result<Map<String, Value>, ParseError> {
    let span = find_json_object(raw).ok_or(ParseError::NoObject)?;
    match serde_json::from_str::<Value>(span)? {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NotAnObject),
    }
}

fn analysis_from_object(object: &Map<String, Value>) -> MoodAnalysis {
    let mood = non_blank_string(object.get("mood"));
    let genre_hints = string_list(object.get("genreHints"));
    let description = non_blank_string(object.get("description"));

    if mood.is_none() || genre_hints.is_none() || description.is_none() {
        tracing::debug!(
            mood_ok = mood.is_some(),
            genre_hints_ok = genre_hints.is_some(),
            description_ok = description.is_some(),
            "Vision reply missing fields, substituting defaults"
        );
    }

    MoodAnalysis::new(
        mood.unwrap_or_else(|| DEFAULT_MOOD.to_string()),
        genre_hints.unwrap_or_else(default_genre_hints),
        description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
    )
}

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Accepts only arrays made entirely of strings.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
