use serde::Serialize;
use serde_json::{Map, Value};

use super::message::Message;

/// Identifies the agent object: `<database>.<schema>.<agent_name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCoordinates {
    pub database: String,
    pub schema: String,
    pub agent_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
/// Directive limiting which tools the agent may call
pub struct ToolChoice(pub Map<String, Value>);

impl ToolChoice {
    /// Promote a shorthand such as `auto` to `{"type": "auto"}`
    pub fn shorthand<S: Into<String>>(kind: S) -> Self {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(kind.into()));
        ToolChoice(map)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRequest {
    #[serde(skip)]
    pub coordinates: AgentCoordinates,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}
