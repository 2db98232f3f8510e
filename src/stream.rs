//! Event-stream chunking policy.
//!
//! A result is streamed instead of returned unary when its textual payload
//! exceeds 1 KiB or its list payload exceeds 10 items. The stream is a
//! sequence of JSON frames: text is chunked at 512-byte boundaries
//! (`{"type":"content",...}`), lists go one frame per item
//! (`{"type":"list_item",...}`), and every stream ends with a
//! `{"type":"complete"}` frame followed by the `[DONE]` sentinel. Frames
//! are SSE-encoded as `data:` lines.

use serde_json::{json, Value};

/// Bytes per content frame.
pub const CHUNK_SIZE: usize = 512;
/// Textual payload above this streams.
pub const TEXT_THRESHOLD: usize = 1024;
/// List payload above this streams.
pub const LIST_THRESHOLD: usize = 10;

/// What a stream would carry for a given result.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamPayload {
    Text(String),
    List(Vec<Value>),
}

/// Decide whether `result` crosses a MUST-stream threshold, and with what
/// payload. Checked payloads are the envelope's text parts and the
/// `tools` / `resources` enumerations.
pub fn stream_payload(result: &Value) -> Option<StreamPayload> {
    if let Some(parts) = result.get("content").and_then(Value::as_array) {
        let text: String = parts
            .iter()
            .filter(|part| part.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        if text.len() > TEXT_THRESHOLD {
            return Some(StreamPayload::Text(text));
        }
    }

    for key in ["tools", "resources"] {
        if let Some(items) = result.get(key).and_then(Value::as_array) {
            if items.len() > LIST_THRESHOLD {
                return Some(StreamPayload::List(items.clone()));
            }
        }
    }

    None
}

/// Split text into chunks of at most [`CHUNK_SIZE`] bytes, never inside a
/// UTF-8 character.
fn chunk_text(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = CHUNK_SIZE.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// Produce every frame of a stream, completion frame included.
pub fn frames(payload: &StreamPayload) -> Vec<Value> {
    let mut frames = Vec::new();
    match payload {
        StreamPayload::Text(text) => {
            let chunks = chunk_text(text);
            let last = chunks.len().saturating_sub(1);
            for (i, chunk) in chunks.iter().enumerate() {
                frames.push(json!({
                    "type": "content",
                    "chunk": chunk,
                    "isComplete": i == last,
                }));
            }
        }
        StreamPayload::List(items) => {
            let last = items.len().saturating_sub(1);
            for (i, item) in items.iter().enumerate() {
                frames.push(json!({
                    "type": "list_item",
                    "item": item,
                    "index": i,
                    "isComplete": i == last,
                }));
            }
        }
    }
    frames.push(json!({"type": "complete"}));
    frames
}

/// SSE-encode a full stream: one `data:` line per frame, then `[DONE]`.
pub fn encode_sse(frames: &[Value]) -> String {
    let mut out = String::new();
    for frame in frames {
        out.push_str("data: ");
        out.push_str(&frame.to_string());
        out.push_str("\n\n");
    }
    out.push_str("data: [DONE]\n\n");
    out
}
