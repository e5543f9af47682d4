//! Single-shot agent execution

use tracing::info;

use super::Runner;
use crate::agents::error::{AgentError, AgentResult};
use crate::config::AgentSpec;

impl Runner {
    /// Run an agent once: prompt it with its instruction plus the current
    /// run context, and append the response to the context store.
    pub async fn run_agent(&self, agent: &AgentSpec) -> AgentResult<String> {
        let context = self.context().context();
        let response = self.generate_with_context(agent, &context).await?;

        self.context().add_output(&agent.id, &response);

        Ok(response)
    }

    /// Generate a response for an agent against an explicit context snapshot
    /// without touching the context store. Parallel branches use this so
    /// that every branch observes the same pre-branch context.
    pub async fn generate_with_context(
        &self,
        agent: &AgentSpec,
        context: &str,
    ) -> AgentResult<String> {
        let client = self.client_for(agent)?;

        let mut prompt = agent.prompt().to_string();
        if !context.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(context);
        }

        info!(agent = %agent.id, model = %client.model(), "Running agent");

        client
            .generate(&prompt)
            .await
            .map_err(|source| AgentError::Generation {
                agent: agent.id.clone(),
                source,
            })
    }
}
