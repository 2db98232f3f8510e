//! The uniform tool-result envelope.
//!
//! Every tool handler produces an [`Envelope`] — a list of typed content
//! parts plus optional structured metadata and advisory warnings. Handlers
//! never return raw strings, and the protocol front-end never sees anything
//! else.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "json")]
    Json { data: serde_json::Value },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    pub content: Vec<ContentPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

impl Envelope {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::Text { text: text.into() }],
            metadata: None,
            warnings: Vec::new(),
        }
    }

    pub fn json(data: serde_json::Value) -> Self {
        Self {
            content: vec![ContentPart::Json { data }],
            metadata: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Total bytes of textual payload across all text parts. Drives the
    /// stream-or-not decision in the protocol front-end.
    pub fn text_len(&self) -> usize {
        self.content
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => text.len(),
                ContentPart::Json { .. } => 0,
            })
            .sum()
    }

    /// All text parts joined in order.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Json { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_envelope_serializes_with_tag() {
        let envelope = Envelope::text("pong");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "pong");
        assert!(value.get("metadata").is_none());
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn warnings_serialize_when_present() {
        let envelope = Envelope::text("ok").with_warnings(vec!["dates disagree".into()]);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["warnings"][0], "dates disagree");
    }

    #[test]
    fn text_len_ignores_json_parts() {
        let mut envelope = Envelope::text("12345");
        envelope.content.push(ContentPart::Json {
            data: json!({"big": "x".repeat(4096)}),
        });
        assert_eq!(envelope.text_len(), 5);
    }

    #[test]
    fn joined_text_concatenates_in_order() {
        let mut envelope = Envelope::text("ab");
        envelope.content.push(ContentPart::Text { text: "cd".into() });
        assert_eq!(envelope.joined_text(), "abcd");
    }
}
