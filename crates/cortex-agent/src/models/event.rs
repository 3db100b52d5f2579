use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single event received while the agent was running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    pub event: String,
    pub data: Value,
}

impl AgentEvent {
    pub fn new<S: Into<String>>(event: S, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Fully materialized result of one agent run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunOutcome {
    pub response: Value,
    pub events: Vec<AgentEvent>,
}
