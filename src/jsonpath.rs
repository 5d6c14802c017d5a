//! Minimal JSON path navigation shared by the request parser and the
//! document transformers.
//!
//! Supports `field`, `field.subfield`, `list[0]` and `list[0].field`, with
//! an optional leading `$.`. Keys may contain `-`, so `response-header`
//! and `service-output` are plain keys.

use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parse a path into segments. `None` when an index is unclosed or not a
/// number.
pub(crate) fn parse_path(path: &str) -> Option<Vec<PathSegment>> {
    let path = path.trim_start_matches("$.");
    let path = path.trim_start_matches('$');

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current)));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current)));
                }
                let mut idx = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    idx.push(c);
                }
                if !closed {
                    return None;
                }
                segments.push(PathSegment::Index(idx.trim().parse().ok()?));
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        segments.push(PathSegment::Key(current));
    }

    Some(segments)
}

/// Get a reference to the value at `path`.
pub(crate) fn get<'a>(json: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    parse_path(path)?
        .into_iter()
        .try_fold(json, |current, segment| match segment {
            PathSegment::Key(key) => current.get(key.as_str()),
            PathSegment::Index(idx) => current.get(idx),
        })
}

/// Get a mutable reference to the value at `path`.
pub(crate) fn get_mut<'a>(json: &'a mut JsonValue, path: &str) -> Option<&'a mut JsonValue> {
    parse_path(path)?
        .into_iter()
        .try_fold(json, |current, segment| match segment {
            PathSegment::Key(key) => current.get_mut(key.as_str()),
            PathSegment::Index(idx) => current.get_mut(idx),
        })
}

/// Render a JSON value as text the way the mock contract reads fields:
/// strings verbatim, scalars in their JSON form, containers as empty.
pub(crate) fn as_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
        JsonValue::Array(_) | JsonValue::Object(_) => String::new(),
    }
}
