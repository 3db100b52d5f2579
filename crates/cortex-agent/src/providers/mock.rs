use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::event::RunOutcome;
use crate::models::request::RunRequest;
use crate::providers::base::AgentClient;

/// A mock client that returns a pre-configured outcome and records requests
pub struct MockAgentClient {
    outcome: Result<RunOutcome, String>,
    requests: Arc<Mutex<Vec<RunRequest>>>,
}

impl MockAgentClient {
    pub fn new(outcome: RunOutcome) -> Self {
        Self {
            outcome: Ok(outcome),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self {
            outcome: Err(message.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the requests seen so far, usable after the client is boxed
    pub fn recorded_requests(&self) -> Arc<Mutex<Vec<RunRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl AgentClient for MockAgentClient {
    async fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.outcome {
            Ok(outcome) => Ok(outcome.clone()),
            Err(message) => Err(anyhow!("{}", message)),
        }
    }
}
