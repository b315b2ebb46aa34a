//! Completion decoding: recovers one JSON object from free-form model output.
//!
//! Models wrap JSON in markdown fences, prepend an explanation, or append a
//! sign-off even when told not to. Lookup order:
//! 1. the first fenced block (```` ```json ```` or bare ```` ``` ````) whose
//!    body is a `{...}` object;
//! 2. otherwise the span from the first `{` to the last `}` of the text.
//!
//! The located span must parse as a JSON object.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static FENCED_OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("completion contains no JSON object")]
    NoObject,

    #[error("completion is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Returns the slice of `text` that should hold the JSON object.
pub fn locate_json_object(text: &str) -> Option<&str> {
    let fenced = if text.contains("```") {
        FENCED_OBJECT_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    } else {
        None
    };
    let candidate = fenced.unwrap_or(text);

    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    (end > start).then(|| &candidate[start..=end])
}

/// Decodes a completion into a JSON object value.
pub fn decode_completion(text: &str) -> Result<Value, DecodeError> {
    let span = locate_json_object(text).ok_or(DecodeError::NoObject)?;
    // The span is brace-delimited, so anything that parses is an object.
    let object: Map<String, Value> =
        serde_json::from_str(span).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    Ok(Value::Object(object))
}
