use anyhow::Result;
use async_trait::async_trait;

use crate::models::event::RunOutcome;
use crate::models::request::RunRequest;

/// Runs an agent and returns its fully materialized result
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn run(&self, request: &RunRequest) -> Result<RunOutcome>;
}
