//! Workflow configuration types and YAML loading

pub mod validator;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use validator::{ConfigValidator, ValidationError};

/// A complete workflow document: agents, model bindings, and an optional
/// workflow topology.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Agent definitions
    pub agents: Vec<AgentSpec>,
    /// Model bindings keyed by name, referenced from agents
    #[serde(default)]
    pub models: HashMap<String, ModelSpec>,
    /// Topology to execute; absent means single-agent invocation
    #[serde(default)]
    pub workflow: Option<WorkflowSpec>,
}

impl WorkflowConfig {
    /// Load a workflow configuration from a YAML file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&data)
    }

    /// Parse a workflow configuration from YAML text and validate it.
    pub fn from_yaml(data: &str) -> anyhow::Result<Self> {
        let config: WorkflowConfig = serde_yaml::from_str(data)?;

        if let Err(errors) = ConfigValidator::validate(&config) {
            let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("invalid workflow configuration:\n  {}", rendered.join("\n  "));
        }

        Ok(config)
    }

    /// Look up an agent definition by id
    pub fn agent(&self, id: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.id == id)
    }
}

/// Declarative description of one agent
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSpec {
    /// Unique agent id
    pub id: String,
    /// Name of the model binding this agent uses
    pub model: String,
    /// Human-readable role
    #[serde(default)]
    pub role: String,
    /// Short objective; used as the prompt when no instruction is given
    #[serde(default)]
    pub goal: String,
    /// Full instruction; takes precedence over `goal`
    #[serde(default)]
    pub instruction: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Shared-memory keys this agent publishes its final output under
    #[serde(default)]
    pub outputs: Vec<String>,
    /// Shared-memory keys injected into this agent's prompts
    #[serde(default)]
    pub requires: Vec<String>,
    /// Agent ids to accept messages from; empty accepts all
    #[serde(default)]
    pub listens_to: Vec<String>,
    /// Per-agent turn cap in collaborative mode; 0 defers to the workflow cap
    #[serde(default)]
    pub max_turns: u32,
    /// Whether this agent may send broadcasts
    #[serde(default)]
    pub can_broadcast: bool,
}

impl AgentSpec {
    /// The base prompt: the instruction when present, otherwise the goal.
    pub fn prompt(&self) -> &str {
        if !self.instruction.is_empty() {
            &self.instruction
        } else {
            &self.goal
        }
    }
}

/// Connection to an LLM provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelSpec {
    /// Provider type
    pub provider: ProviderKind,
    /// Model name/identifier
    pub model: String,
    /// Custom endpoint (self-hosted or proxied)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API key; falls back to the provider's environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Max tokens per completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic (Claude)
    Anthropic,
    /// OpenAI (GPT)
    OpenAI,
    /// Google Gemini
    #[serde(alias = "google")]
    Gemini,
    /// Ollama (local models, no API key)
    Ollama,
}

impl ProviderKind {
    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Ollama => "OLLAMA_API_KEY",
        }
    }

    /// Whether the provider requires an API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Ollama => write!(f, "ollama"),
        }
    }
}

/// Topology of a workflow run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowSpec {
    /// Scheduling discipline
    #[serde(rename = "type")]
    pub kind: WorkflowKind,
    /// Ordered steps for sequential workflows
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Agents to run concurrently for parallel workflows
    #[serde(default)]
    pub branches: Vec<String>,
    /// Optional join agent run after all branches succeed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<Step>,
    /// Agents participating in a collaborative workflow
    #[serde(default)]
    pub collaborators: Vec<String>,
    /// Global per-agent turn cap for collaborative workflows
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

fn default_max_turns() -> u32 {
    10
}

/// Workflow scheduling disciplines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowKind {
    /// Agents execute in order, each observing prior outputs
    Sequential,
    /// Branches execute concurrently with an optional join
    Parallel,
    /// Agents exchange messages freely over a shared channel
    Collaborative,
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowKind::Sequential => write!(f, "sequential"),
            WorkflowKind::Parallel => write!(f, "parallel"),
            WorkflowKind::Collaborative => write!(f, "collaborative"),
        }
    }
}

/// One step of a sequential workflow (or the join of a parallel one)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Step {
    /// Agent id to run
    pub agent: String,
}
