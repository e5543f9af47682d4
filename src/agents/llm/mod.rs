//! LLM client implementations
//!
//! A unified `Generate` capability over the supported providers:
//! - Anthropic (Claude)
//! - OpenAI (GPT)
//! - Google Gemini
//! - Ollama (local models)

mod anthropic;
mod gemini;
mod ollama;
mod openai;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use std::env;
use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::error::{LlmError, LlmResult};
use crate::config::{ModelSpec, ProviderKind};

/// Trait for LLM clients
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;

    /// Generate a completion for a prompt
    async fn generate(&self, prompt: &str) -> LlmResult<String>;
}

/// Create an LLM client from a model binding
pub fn create_client(spec: &ModelSpec) -> LlmResult<Arc<dyn LlmClient>> {
    match spec.provider {
        ProviderKind::Anthropic => {
            let client = AnthropicClient::new(spec)?;
            Ok(Arc::new(client))
        }
        ProviderKind::OpenAI => {
            let client = OpenAiClient::new(spec)?;
            Ok(Arc::new(client))
        }
        ProviderKind::Gemini => {
            let client = GeminiClient::new(spec)?;
            Ok(Arc::new(client))
        }
        ProviderKind::Ollama => {
            // Ollama doesn't require an API key
            let client = OllamaClient::new(spec);
            Ok(Arc::new(client))
        }
    }
}

/// Resolve the API key for a model binding.
///
/// An explicit `api_key` in the configuration wins; otherwise the provider's
/// `<PROVIDER>_API_KEY` environment variable is consulted.
pub(crate) fn resolve_api_key(spec: &ModelSpec) -> LlmResult<String> {
    if let Some(key) = &spec.api_key {
        if !key.is_empty() {
            return Ok(key.clone());
        }
    }

    let env_var = spec.provider.api_key_env();
    env::var(env_var).map_err(|_| {
        LlmError::Authentication(format!("{} environment variable not set", env_var))
    })
}
