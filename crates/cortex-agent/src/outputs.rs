use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

use crate::inputs::EnvLookup;

pub const RESULT_JSON: &str = "result-json";
pub const RESULT_FILE: &str = "result-file";
pub const EVENTS_JSON: &str = "events-json";
pub const ANSWER_TEXT: &str = "answer-text";

/// Step outputs for the workflow runner. Outside a runner every call is a
/// no-op, so the same code path works for local runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutputs {
    output_file: Option<PathBuf>,
}

impl WorkflowOutputs {
    /// Enabled only when `GITHUB_ACTIONS=true` and `GITHUB_OUTPUT` names a file.
    pub fn detect(env: &impl EnvLookup) -> Self {
        let in_runner = env
            .var("GITHUB_ACTIONS")
            .map(|value| value.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let output_file = env
            .var("GITHUB_OUTPUT")
            .filter(|path| !path.trim().is_empty());

        match (in_runner, output_file) {
            (true, Some(path)) => Self::to_file(path),
            _ => Self::disabled(),
        }
    }

    pub fn disabled() -> Self {
        Self { output_file: None }
    }

    pub fn to_file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            output_file: Some(path.into()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.output_file.is_some()
    }

    /// Appends `name` to the output file using a heredoc block, so values may
    /// span several lines.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let Some(path) = &self.output_file else {
            return Ok(());
        };

        let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open output file {}", path.display()))?;
        write!(file, "{name}<<{delimiter}\n{value}\n{delimiter}\n")
            .with_context(|| format!("failed to write output `{name}`"))?;
        Ok(())
    }

    /// Marks the step as failed with an error annotation.
    pub fn report_failure(&self, message: &str) {
        if self.is_enabled() {
            println!("::error::{}", escape_command_data(message));
        }
    }
}

fn escape_command_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
