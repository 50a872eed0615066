//! Tolerant parsing of structured LLM replies.
//!
//! `parse_reply` is total: whatever the model sends back, callers get a fully
//! defaulted record plus a `ReplyStatus` saying how much of it was real.

mod schema;

pub use schema::StructuredReply;

use serde::Serialize;
use serde_json::Value;

/// Prefix the upstream client uses for error strings returned in place of content.
pub const UPSTREAM_ERROR_PREFIX: &str = "Error:";

/// What happened to a raw reply on its way through the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ReplyStatus {
    /// Decoded as a JSON object.
    Parsed,
    /// Reply was empty or whitespace only.
    Empty,
    /// Reply was an upstream error string; it was never decoded.
    UpstreamError(String),
    /// Reply could not be decoded as a JSON object.
    Malformed(String),
}

/// A parsed reply. `record` is always usable; `defaulted` names every field that
/// was missing or had to be coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply<T> {
    pub record: T,
    pub status: ReplyStatus,
    pub defaulted: Vec<String>,
}

impl<T> ParsedReply<T> {
    #[cfg(test)]
    pub fn is_parsed(&self) -> bool {
        self.status == ReplyStatus::Parsed
    }
}

/// Parses `raw` against the schema of `T`.
pub fn parse_reply<T: StructuredReply>(raw: &str) -> ParsedReply<T> {
    let trimmed = raw.trim();

    let status = if trimmed.is_empty() {
        ReplyStatus::Empty
    } else if let Some(message) = upstream_error(trimmed) {
        ReplyStatus::UpstreamError(message.to_string())
    } else {
        match serde_json::from_str::<Value>(strip_code_fences(trimmed)) {
            Ok(value @ Value::Object(_)) => {
                let mut defaulted = Vec::new();
                let record = T::from_value(&value, &mut defaulted);
                return ParsedReply {
                    record,
                    status: ReplyStatus::Parsed,
                    defaulted,
                };
            }
            Ok(other) => ReplyStatus::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )),
            Err(e) => ReplyStatus::Malformed(e.to_string()),
        }
    };

    ParsedReply {
        record: T::default(),
        status,
        defaulted: Vec::new(),
    }
}

/// The error string, if `raw` is an upstream error sentinel rather than content.
pub fn upstream_error(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    trimmed
        .starts_with(UPSTREAM_ERROR_PREFIX)
        .then_some(trimmed)
}

/// Strips a leading ```` ``` ```` fence (with or without a language tag) and a trailing one.
pub fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = strip_language_tag(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Drops a language tag right after an opening fence. The tag must end the
/// line, or be followed on the same line by the start of a JSON document.
fn strip_language_tag(rest: &str) -> &str {
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
        .unwrap_or(rest.len());
    if tag_len == 0 {
        return rest;
    }

    let after_tag = &rest[tag_len..];
    let same_line = after_tag.trim_start_matches([' ', '\t']);
    let ends_line = same_line.is_empty()
        || same_line.starts_with(['\n', '\r'])
        || same_line.starts_with("```");
    let opens_json = after_tag.trim_start().starts_with(['{', '[']);

    if ends_line || opens_json {
        after_tag
    } else {
        rest
    }
}

/// Cleans a free-text question reply: drops an enclosing code fence and outer whitespace.
pub fn clean_question_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6 {
        strip_code_fences(trimmed).to_string()
    } else {
        trimmed.to_string()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
