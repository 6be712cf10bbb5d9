//! Scripted backend for hosts and tests that must not reach the network.
//!
//! Every handle created by a [`MockConnector`] shares one call log, so a test can
//! assert how many remote calls an operation made and what was sent.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{AssistantError, Result};
use crate::llm::backend::{Connector, Credential, GenerationRequest, GenerativeBackend};

#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    requests: Vec<GenerationRequest>,
    connects: Vec<(Credential, String)>,
    rejected_keys: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply. When the queue is empty the backend echoes the prompt.
    pub fn reply(&self, text: impl Into<String>) -> &Self {
        self.lock().replies.push_back(MockReply::Text(text.into()));
        self
    }

    /// Queues a failure, surfaced as a backend error with this message.
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.lock().replies.push_back(MockReply::Fail(message.into()));
        self
    }

    /// Makes `connect` refuse this key outright.
    pub fn reject_key(&self, key: impl Into<String>) -> &Self {
        self.lock().rejected_keys.push(key.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.lock().requests.last().cloned()
    }

    /// `(credential, model)` for every handle handed out so far.
    pub fn connections(&self) -> Vec<(Credential, String)> {
        self.lock().connects.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Connector for MockConnector {
    fn connect(&self, credential: &Credential, model: &str) -> Result<Arc<dyn GenerativeBackend>> {
        let mut state = self.lock();
        if state
            .rejected_keys
            .iter()
            .any(|k| k.as_str() == credential.expose())
        {
            return Err(AssistantError::Backend("API key not valid".to_string()));
        }
        state.connects.push((credential.clone(), model.to_string()));

        Ok(Arc::new(MockBackend {
            model: model.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

#[derive(Debug)]
pub struct MockBackend {
    model: String,
    state: Arc<Mutex<MockState>>,
}

#[async_trait::async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        log::debug!("Mock backend '{}' handling request", self.model);

        let echo = format!("Mock response to: {}", request.prompt);
        state.requests.push(request);

        match state.replies.pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail(message)) => Err(AssistantError::Backend(message)),
            None => Ok(echo),
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}
