//! Agent execution
//!
//! The [`Runner`] executes agents in two modes:
//! - Single-shot: one prompt, one response, appended to the run context
//! - Collaborative: a multi-turn loop over a shared message channel

mod collaborative;
mod single_shot;

pub use collaborative::DEFAULT_MAX_TURNS;

use std::collections::HashMap;
use std::sync::Arc;

use crate::agents::context::ContextStore;
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::llm::{create_client, LlmClient};
use crate::agents::memory::SharedMemory;
use crate::config::{AgentSpec, WorkflowConfig};

/// Executes agents against their model clients.
///
/// Holds one client per model binding (built once, immutable afterwards),
/// the run's context store, and the shared key/value memory.
pub struct Runner {
    clients: HashMap<String, Arc<dyn LlmClient>>,
    context: ContextStore,
    shared: SharedMemory,
}

impl Runner {
    /// Build a runner from a workflow configuration, creating one client per
    /// model binding. Fails fast on a missing API key.
    pub fn from_config(config: &WorkflowConfig) -> AgentResult<Self> {
        let mut clients = HashMap::new();
        for (name, spec) in &config.models {
            let client = create_client(spec).map_err(|e| {
                AgentError::Configuration(format!("model '{}': {}", name, e))
            })?;
            clients.insert(name.clone(), client);
        }

        Ok(Self::with_clients(clients))
    }

    /// Build a runner over pre-constructed clients.
    pub fn with_clients(clients: HashMap<String, Arc<dyn LlmClient>>) -> Self {
        Self {
            clients,
            context: ContextStore::new(),
            shared: SharedMemory::new(),
        }
    }

    /// The run's context store
    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    /// The run's shared key/value memory
    pub fn shared_memory(&self) -> &SharedMemory {
        &self.shared
    }

    pub(crate) fn client_for(&self, agent: &AgentSpec) -> AgentResult<Arc<dyn LlmClient>> {
        self.clients
            .get(&agent.model)
            .cloned()
            .ok_or_else(|| AgentError::ModelNotFound(agent.model.clone()))
    }
}
