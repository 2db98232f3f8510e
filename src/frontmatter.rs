//! Structured header block ("frontmatter") tokenizer and writer.
//!
//! The grammar is deliberately small — this is not YAML:
//!
//! - the block is delimited by a line of exactly `---` at byte 0 and again
//!   further down; a missing closing delimiter means there is no block
//! - between the delimiters: `key: value` lines, where a key matches
//!   `[a-z][a-z0-9-_]*`
//! - a key with an empty value may be followed by list items, one per line,
//!   prefixed by `- `
//!
//! Entries keep their order so a parse → edit → write round trip preserves
//! the note's look. Lines that do not fit the grammar are skipped; a block
//! where nothing parses is an empty header, not an error.

use serde::Serialize;

/// A single header value. Dates stay strings; the callers that care parse
/// them with `chrono` on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
}

impl HeaderValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// An ordered `key -> value` header block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderBlock {
    entries: Vec<(String, HeaderValue)>,
}

impl HeaderBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. A replaced key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: HeaderValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<HeaderValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into a JSON map for metadata payloads.
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.entries
            .iter()
            .map(|(k, v)| {
                let value = serde_json::to_value(v).unwrap_or(serde_json::Value::Null);
                (k.clone(), value)
            })
            .collect()
    }
}

/// `true` iff `key` matches `[a-z][a-z0-9-_]*`.
fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

fn parse_scalar(raw: &str) -> HeaderValue {
    let raw = raw.trim();
    if let Some(stripped) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return HeaderValue::String(stripped.to_string());
    }
    match raw {
        "true" => return HeaderValue::Bool(true),
        "false" => return HeaderValue::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return HeaderValue::Integer(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return HeaderValue::Float(f);
    }
    HeaderValue::String(raw.to_string())
}

fn parse_inline_list(raw: &str) -> Option<HeaderValue> {
    let inner = raw.strip_prefix('[')?.strip_suffix(']')?;
    let items = inner
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|item| !item.is_empty())
        .collect();
    Some(HeaderValue::List(items))
}

/// Split a note into its header block (if any) and body. The body borrows
/// from the input and starts after the closing delimiter, with the blank
/// separator lines trimmed.
pub fn parse(content: &str) -> (Option<HeaderBlock>, &str) {
    let Some(rest) = content.strip_prefix("---\n") else {
        return (None, content);
    };

    // Find the closing delimiter: a line that is exactly "---".
    let mut close: Option<(usize, usize)> = None; // (block_end, body_start)
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let stripped = line.strip_suffix('\n').unwrap_or(line);
        if stripped == "---" {
            close = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((block_end, body_start)) = close else {
        return (None, content);
    };

    let block_text = &rest[..block_end];
    let body = rest[body_start..].trim_start_matches('\n');

    let mut header = HeaderBlock::new();
    let mut pending_list: Option<(String, Vec<String>)> = None;

    for line in block_text.lines() {
        let trimmed = line.trim();

        if let Some(item) = trimmed.strip_prefix("- ") {
            if let Some((_, items)) = pending_list.as_mut() {
                let item = item.trim().trim_matches('"').trim_matches('\'');
                if !item.is_empty() {
                    items.push(item.to_string());
                }
                continue;
            }
            // List item without a preceding key — not in the grammar.
            continue;
        }

        if let Some((key, items)) = pending_list.take() {
            header.set(key, HeaderValue::List(items));
        }

        if trimmed.is_empty() {
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if !is_valid_key(key) {
            continue;
        }
        let value = value.trim();

        if value.is_empty() {
            pending_list = Some((key.to_string(), Vec::new()));
        } else if let Some(list) = parse_inline_list(value) {
            header.set(key, list);
        } else {
            header.set(key, parse_scalar(value));
        }
    }
    if let Some((key, items)) = pending_list.take() {
        header.set(key, HeaderValue::List(items));
    }

    (Some(header), body)
}

/// Write a header block back out, delimiters included, with a trailing
/// newline. Lists use the block form the parser prefers.
pub fn serialize(header: &HeaderBlock) -> String {
    let mut out = String::from("---\n");
    for (key, value) in header.iter() {
        match value {
            HeaderValue::String(s) => out.push_str(&format!("{key}: {s}\n")),
            HeaderValue::Integer(n) => out.push_str(&format!("{key}: {n}\n")),
            HeaderValue::Float(f) => out.push_str(&format!("{key}: {f}\n")),
            HeaderValue::Bool(b) => out.push_str(&format!("{key}: {b}\n")),
            HeaderValue::List(items) => {
                out.push_str(&format!("{key}:\n"));
                for item in items {
                    out.push_str(&format!("  - {item}\n"));
                }
            }
        }
    }
    out.push_str("---\n");
    out
}

/// Combine a header block and a body into full note content. An empty
/// header produces the bare body.
pub fn compose(header: &HeaderBlock, body: &str) -> String {
    if header.is_empty() {
        return body.to_string();
    }
    format!("{}\n{}", serialize(header), body)
}
