use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// One part of a message body. Parts other than text are passed through untouched.
pub enum ContentPart {
    Text(TextContent),
    Other(Map<String, Value>),
}

impl ContentPart {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentPart::Text(TextContent {
            kind: TextKind::Text,
            text: text.into(),
        })
    }

    /// Get the text content if this is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(&text.text),
            ContentPart::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message sent to the agent
pub struct Message {
    pub role: String,
    pub content: Vec<ContentPart>,
    /// Any other message-level keys, forwarded as given
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Create a user message with a single text part
    pub fn user_text<S: Into<String>>(text: S) -> Self {
        Message {
            role: "user".to_string(),
            content: vec![ContentPart::text(text)],
            extra: Map::new(),
        }
    }
}
