//! Reduce a free-text completion to the single JSON object it carries.
//!
//! Each `{` is tried in order as the start of a JSON value using serde_json's
//! streaming deserializer, which stops at the end of the first complete value
//! and understands braces inside string literals. Starts inside a candidate
//! that was already rejected are not retried, so a truncated or malformed
//! object never yields one of its nested fragments. When no start yields an
//! object, the first `{` through the last `}` is parsed as a last resort.

use serde_json::{Deserializer, Map, Value};

use super::EnrichmentError;
use crate::upstream::excerpt;

/// Longest candidate excerpt carried by `InvalidJson`.
pub const CANDIDATE_EXCERPT_CHARS: usize = 200;

/// Opening braces tried before falling back to the first/last brace span.
const MAX_START_ATTEMPTS: usize = 64;

/// Extract the first well-formed JSON object from `text`.
pub fn extract_json(text: &str) -> Result<Map<String, Value>, EnrichmentError> {
    let Some(first_open) = text.find('{') else {
        return Err(EnrichmentError::NoJsonFound);
    };

    if let Some(object) = first_complete_object(text, first_open) {
        return Ok(object);
    }

    match text.rfind('}') {
        Some(last_close) if last_close > first_open => {
            parse_object(&text[first_open..=last_close])
        }
        // Only closing braces ahead of the first opening one.
        Some(_) => Err(EnrichmentError::NoJsonFound),
        // Opened but never closed: a truncated completion.
        None => parse_object(&text[first_open..]),
    }
}

/// Tokenizer pass: stream-parse one value at each `{` until one is an object.
///
/// A start that runs into end of input ends the pass, and a start that hits a
/// syntax error rules out every `{` before the error position.
fn first_complete_object(text: &str, first_open: usize) -> Option<Map<String, Value>> {
    let mut resume_at = first_open;
    let mut attempts = 0;
    for (start, _) in text.match_indices('{') {
        if start < resume_at {
            continue;
        }
        if attempts == MAX_START_ATTEMPTS {
            break;
        }
        attempts += 1;

        let candidate = &text[start..];
        let mut stream = Deserializer::from_str(candidate).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(object))) => return Some(object),
            Some(Err(e)) if e.is_eof() => return None,
            Some(Err(e)) => resume_at = start + error_offset(candidate, &e).max(1),
            _ => resume_at = start + 1,
        }
    }
    None
}

/// Byte offset in `candidate` of the character a parse error points at.
fn error_offset(candidate: &str, err: &serde_json::Error) -> usize {
    if err.line() == 0 {
        return 0;
    }
    let line_start: usize = candidate
        .split_inclusive('\n')
        .take(err.line() - 1)
        .map(str::len)
        .sum();
    (line_start + err.column().saturating_sub(1)).min(candidate.len())
}

fn parse_object(candidate: &str) -> Result<Map<String, Value>, EnrichmentError> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(EnrichmentError::InvalidJson {
            diagnostic: format!("expected a JSON object, found {}", kind_of(&other)),
            excerpt: excerpt(candidate, CANDIDATE_EXCERPT_CHARS),
        }),
        Err(e) => {
            tracing::debug!(error = %e, "Completion candidate failed to parse");
            Err(EnrichmentError::InvalidJson {
                diagnostic: e.to_string(),
                excerpt: excerpt(candidate, CANDIDATE_EXCERPT_CHARS),
            })
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
