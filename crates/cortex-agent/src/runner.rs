use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use crate::extract::extract_answer;
use crate::inputs::RunConfig;
use crate::outputs::{WorkflowOutputs, ANSWER_TEXT, EVENTS_JSON, RESULT_FILE, RESULT_JSON};
use crate::persist::persist_result;
use crate::providers::base::AgentClient;

/// What a run produced, as published to the workflow
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub result_json: String,
    pub result_file: Option<PathBuf>,
    pub events_json: String,
    pub answer: Option<String>,
}

/// Runs the agent once and publishes the result.
pub struct Runner {
    client: Box<dyn AgentClient>,
    outputs: WorkflowOutputs,
}

impl Runner {
    pub fn new(client: Box<dyn AgentClient>, outputs: WorkflowOutputs) -> Self {
        Self { client, outputs }
    }

    pub async fn run(&self, config: &RunConfig) -> Result<RunReport> {
        let outcome = self.client.run(&config.request).await?;
        info!("Agent run finished with {} event(s)", outcome.events.len());

        let (result_json, result_file) = if config.persist {
            let path = persist_result(&outcome.response, &config.persist_dir)?;
            info!("Persisted result to {}", path.display());
            let marker = json!({"persisted": true, "path": path.display().to_string()});
            (marker.to_string(), Some(path))
        } else {
            (serde_json::to_string(&outcome.response)?, None)
        };
        let events_json = serde_json::to_string(&outcome.events)?;
        let answer = extract_answer(&outcome.response).filter(|text| !text.trim().is_empty());

        self.outputs.set(RESULT_JSON, &result_json)?;
        let result_file_value = result_file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        self.outputs.set(RESULT_FILE, &result_file_value)?;
        self.outputs.set(EVENTS_JSON, &events_json)?;
        if let Some(answer) = &answer {
            self.outputs.set(ANSWER_TEXT, answer)?;
        }

        Ok(RunReport {
            result_json,
            result_file,
            events_json,
            answer,
        })
    }
}
