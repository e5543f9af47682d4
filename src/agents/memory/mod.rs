//! Shared state for a workflow run
//!
//! Two kinds of shared state live here: the pub/sub [`channel`] that backs
//! collaborative workflows, and a key/value [`SharedMemory`] through which
//! agents publish (`outputs`) and consume (`requires`) named values.

pub mod channel;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

/// Key/value memory shared across all agents in a workflow run.
///
/// Values are arbitrary JSON; they are rendered to text when injected into
/// prompts. Cloning is cheap and all clones observe the same state.
#[derive(Clone, Default)]
pub struct SharedMemory {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl SharedMemory {
    /// Create an empty shared memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by key
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.values.read().await.get(key).cloned()
    }

    /// Store a value under a key, replacing any previous value
    pub async fn set(&self, key: &str, value: Value) {
        self.values.write().await.insert(key.to_string(), value);
    }

    /// Render a stored value as prompt text.
    ///
    /// Strings are injected as-is; other values use their JSON form.
    pub async fn get_text(&self, key: &str) -> Option<String> {
        self.get(key).await.map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }
}
