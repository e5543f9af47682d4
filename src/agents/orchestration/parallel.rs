//! Parallel workflow discipline

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::debug;

use super::lookup_agent;
use crate::agents::core::Runner;
use crate::agents::error::{AgentError, AgentResult};
use crate::config::{WorkflowConfig, WorkflowSpec};

/// Parallel executor: every branch runs concurrently against the pre-branch
/// context; successes are appended to the context store in completion order.
/// On the first failure the remaining branches are aborted and the error is
/// returned once in-flight branches settle. An optional `then` agent joins
/// the branch outputs.
pub struct ParallelExecutor;

impl ParallelExecutor {
    pub async fn execute(
        runner: &Arc<Runner>,
        config: &WorkflowConfig,
        workflow: &WorkflowSpec,
    ) -> AgentResult<String> {
        let snapshot = runner.context().context();

        let mut tasks = JoinSet::new();
        for branch in &workflow.branches {
            let agent = lookup_agent(config, branch)?.clone();
            let runner = runner.clone();
            let snapshot = snapshot.clone();

            tasks.spawn(async move {
                let output = runner.generate_with_context(&agent, &snapshot).await?;
                Ok::<(String, String), AgentError>((agent.id, output))
            });
        }

        let mut first_error: Option<AgentError> = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((agent_id, output))) => {
                    debug!(agent = %agent_id, "Branch completed");
                    runner.context().add_output(&agent_id, &output);
                }
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                        tasks.abort_all();
                    }
                }
                Err(join_err) => {
                    if !join_err.is_cancelled() && first_error.is_none() {
                        first_error =
                            Some(AgentError::Internal(format!("branch task failed: {}", join_err)));
                        tasks.abort_all();
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        if let Some(then) = &workflow.then {
            let agent = lookup_agent(config, &then.agent)?;
            runner.run_agent(agent).await?;
        }

        Ok(runner.context().last_output())
    }
}
