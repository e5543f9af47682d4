//! Collaborative workflow discipline

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use super::lookup_agent;
use crate::agents::core::Runner;
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::memory::channel::MessageChannel;
use crate::config::{WorkflowConfig, WorkflowSpec};

/// Collaborative executor: one message channel per run, one runner task per
/// collaborator. The channel is closed only after every runner has returned;
/// a failed agent does not tear down its peers. The final output is the
/// return value of the last configured collaborator.
pub struct CollaborativeExecutor;

impl CollaborativeExecutor {
    pub async fn execute(
        runner: &Arc<Runner>,
        config: &WorkflowConfig,
        workflow: &WorkflowSpec,
    ) -> AgentResult<String> {
        let channel = Arc::new(MessageChannel::new(0));

        // Subscribe every collaborator before any runner starts so the
        // earliest sends cannot miss a not-yet-subscribed peer.
        for id in &workflow.collaborators {
            channel.subscribe(id).await;
        }

        let mut handles = Vec::new();
        for id in &workflow.collaborators {
            let agent = lookup_agent(config, id)?.clone();
            let runner = runner.clone();
            let channel = channel.clone();
            let global_max_turns = workflow.max_turns;

            handles.push(tokio::spawn(async move {
                let output = runner
                    .run_collaborative(&agent, &channel, global_max_turns)
                    .await?;
                Ok::<(String, String), AgentError>((agent.id, output))
            }));
        }

        let mut outputs: HashMap<String, String> = HashMap::new();
        let mut first_error: Option<AgentError> = None;

        for joined in join_all(handles).await {
            match joined {
                Ok(Ok((agent_id, output))) => {
                    debug!(agent = %agent_id, "Collaborator finished");
                    outputs.insert(agent_id, output);
                }
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(join_err) => {
                    if first_error.is_none() {
                        first_error = Some(AgentError::Internal(format!(
                            "collaborator task failed: {}",
                            join_err
                        )));
                    }
                }
            }
        }

        channel.close().await;

        if let Some(e) = first_error {
            return Err(e);
        }

        let designated = workflow.collaborators.last().ok_or_else(|| {
            AgentError::Execution("collaborative workflow has no collaborators".to_string())
        })?;

        Ok(outputs.remove(designated).unwrap_or_default())
    }
}
