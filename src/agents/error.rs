//! Error types for agent execution

use thiserror::Error;

use crate::agents::memory::channel::ChannelError;

/// Errors that can occur while running agents and workflows
#[derive(Debug, Error)]
pub enum AgentError {
    /// Agent not found
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// Model referenced by an agent is not defined
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Single-shot generation failure, annotated with the agent id
    #[error("Agent {agent} failed: {source}")]
    Generation {
        agent: String,
        #[source]
        source: LlmError,
    },

    /// Collaborative generation failure, annotated with agent id and turn
    #[error("Agent {agent} turn {turn} failed: {source}")]
    Turn {
        agent: String,
        turn: u32,
        #[source]
        source: LlmError,
    },

    /// Message channel error
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Workflow execution error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors specific to LLM client operations
#[derive(Debug, Error)]
pub enum LlmError {
    /// API error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Empty response from the provider
    #[error("Empty response from provider")]
    EmptyResponse,

    /// Timeout
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Network(format!("Connection error: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
