//! Ordered log of agent outputs accumulated during a workflow run

use std::sync::Mutex;

/// One agent's result
#[derive(Debug, Clone)]
pub struct ContextEntry {
    /// Agent that produced the output
    pub agent_id: String,
    /// The output text
    pub output: String,
}

/// Append-only store of `(agent, output)` pairs, shared across a run.
///
/// Writes are serialized by an internal mutex; the executor appends after
/// each agent returns. Not persisted.
#[derive(Default)]
pub struct ContextStore {
    entries: Mutex<Vec<ContextEntry>>,
}

impl ContextStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one agent's output
    pub fn add_output(&self, agent_id: &str, output: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(ContextEntry {
            agent_id: agent_id.to_string(),
            output: output.to_string(),
        });
    }

    /// Render all entries for prompt inclusion, in insertion order.
    ///
    /// Returns the empty string when no agent has produced output yet.
    pub fn context(&self) -> String {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.is_empty() {
            return String::new();
        }

        let mut out = String::from("## Previous Agent Outputs\n");
        for entry in entries.iter() {
            out.push_str(&format!("\n[{}]:\n{}\n", entry.agent_id, entry.output));
        }
        out
    }

    /// The output of the most recent entry, or empty if none
    pub fn last_output(&self) -> String {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.last().map(|e| e.output.clone()).unwrap_or_default()
    }
}
