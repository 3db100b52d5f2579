use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::base::AgentClient;
use super::configs::SnowflakeConfig;
use crate::models::event::{AgentEvent, RunOutcome};
use crate::models::request::{AgentCoordinates, RunRequest};

const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

/// Runs Cortex agents through the Snowflake REST API.
pub struct SnowflakeAgentClient {
    client: Client,
    config: SnowflakeConfig,
}

impl SnowflakeAgentClient {
    pub fn new(config: SnowflakeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn run_url(&self, coordinates: &AgentCoordinates) -> String {
        format!(
            "{}/api/v2/databases/{}/schemas/{}/agents/{}:run",
            self.config.account_url.trim_end_matches('/'),
            urlencoding::encode(&coordinates.database),
            urlencoding::encode(&coordinates.schema),
            urlencoding::encode(&coordinates.agent_name)
        )
    }
}

#[async_trait]
impl AgentClient for SnowflakeAgentClient {
    async fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        let url = self.run_url(&request.coordinates);
        info!(
            "Running agent {}.{}.{} with {} message(s)",
            request.coordinates.database,
            request.coordinates.schema,
            request.coordinates.agent_name,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(TOKEN_TYPE_HEADER, &self.config.token_type)
            .header(ACCEPT, "text/event-stream, application/json")
            .json(request)
            .send()
            .await
            .context("failed to reach Snowflake")?;

        let status = response.status();
        if !status.is_success() {
            let err_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Request failed: {}: {}", status, err_text));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        if content_type.contains("text/event-stream") {
            let body = response
                .text()
                .await
                .context("failed to read agent event stream")?;
            let events = parse_event_stream(&body);
            debug!("Received {} event(s)", events.len());
            outcome_from_events(events)
        } else {
            let body: Value = response
                .json()
                .await
                .context("failed to decode agent response")?;
            Ok(RunOutcome {
                response: body,
                events: Vec::new(),
            })
        }
    }
}

/// Splits a server-sent event body into events. Data that is not JSON is
/// kept as a string.
pub fn parse_event_stream(body: &str) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    let mut name: Option<String> = None;
    let mut data: Vec<&str> = Vec::new();

    for line in body.lines() {
        if line.is_empty() {
            dispatch(&mut events, name.take(), &mut data);
            continue;
        }
        if line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => name = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }
    dispatch(&mut events, name, &mut data);

    events
}

fn dispatch(events: &mut Vec<AgentEvent>, name: Option<String>, data: &mut Vec<&str>) {
    if data.is_empty() {
        return;
    }
    let raw = data.join("\n");
    data.clear();

    let name = name.unwrap_or_else(|| "message".to_string());
    let value = serde_json::from_str(&raw).unwrap_or_else(|_| {
        warn!("Event `{}` carried non-JSON data", name);
        Value::String(raw)
    });
    events.push(AgentEvent::new(name, value));
}

/// The final `response` event wins; without one the streamed text deltas
/// are stitched into an assistant message.
fn outcome_from_events(events: Vec<AgentEvent>) -> Result<RunOutcome> {
    if let Some(error) = events.iter().find(|event| event.event == "error") {
        return Err(anyhow!("Agent run failed: {}", error.data));
    }

    let response = events
        .iter()
        .rev()
        .find(|event| event.event == "response")
        .map(|event| event.data.clone())
        .or_else(|| {
            let text: String = events
                .iter()
                .filter(|event| event.event == "response.text.delta")
                .filter_map(|event| event.data.get("text").and_then(Value::as_str))
                .collect();
            if text.is_empty() {
                None
            } else {
                Some(json!({
                    "role": "assistant",
                    "content": [{"type": "text", "text": text}]
                }))
            }
        })
        .unwrap_or(Value::Null);

    Ok(RunOutcome { response, events })
}
