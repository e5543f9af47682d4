//! Ollama LLM client (local models)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::LlmClient;
use crate::agents::error::{LlmError, LlmResult};
use crate::config::ModelSpec;

/// Ollama LLM client. No API key required.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
}

impl OllamaClient {
    /// Create a new Ollama client from a model binding
    pub fn new(spec: &ModelSpec) -> Self {
        let base_url = spec
            .endpoint
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        Self {
            client: reqwest::Client::new(),
            base_url,
            model: spec.model.clone(),
            max_tokens: spec.max_tokens,
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> LlmResult<String> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
            "options": {
                "num_predict": self.max_tokens,
            }
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {}", e)))?;

        Ok(parsed.message.content)
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}
