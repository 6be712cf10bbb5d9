//! One assistant per host session.
//!
//! The facade itself is not shared between callers. A host serving several
//! users keeps a [`SessionPool`] and locks the session's assistant for the
//! duration of each operation, so transcripts and document text never mix and
//! calls within a session run one at a time.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;

use crate::assistant::AssistantFacade;
use crate::config::AssistantConfig;
use crate::llm::backend::Connector;

pub type SharedAssistant<C> = Arc<Mutex<AssistantFacade<C>>>;

pub struct SessionPool<C: Connector + Clone> {
    connector: C,
    config: AssistantConfig,
    sessions: Mutex<HashMap<String, SharedAssistant<C>>>,
}

impl<C: Connector + Clone> SessionPool<C> {
    pub fn new(connector: C, config: AssistantConfig) -> Self {
        Self {
            connector,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The assistant for `session_id`, created unconfigured on first use.
    pub async fn session(&self, session_id: &str) -> SharedAssistant<C> {
        let mut sessions = self.sessions.lock().await;
        let assistant = sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!("Creating assistant for session {}", session_id);
            Arc::new(Mutex::new(AssistantFacade::new(
                self.connector.clone(),
                self.config.clone(),
            )))
        });
        Arc::clone(assistant)
    }

    /// Drops the session. Callers still holding its handle keep a working assistant.
    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
