//! Workflow execution
//!
//! The executor selects a scheduling discipline from the workflow type:
//! - Sequential: agents run in order, each observing prior outputs
//! - Parallel: branches run concurrently with an optional join agent
//! - Collaborative: agents exchange messages over a shared channel

mod collaborative;
mod parallel;
mod sequential;

pub use collaborative::CollaborativeExecutor;
pub use parallel::ParallelExecutor;
pub use sequential::SequentialExecutor;

use std::sync::Arc;

use tracing::info;

use crate::agents::core::Runner;
use crate::agents::error::{AgentError, AgentResult};
use crate::config::{WorkflowConfig, WorkflowKind};

/// Executes a workflow configuration to a final output.
///
/// Owns the run's [`Runner`] and, for collaborative workflows, the message
/// channel: the executor constructs the channel, guarantees all runners have
/// returned, and closes it.
pub struct Executor {
    config: Arc<WorkflowConfig>,
    runner: Arc<Runner>,
}

impl Executor {
    /// Build an executor for a configuration, constructing one LLM client
    /// per model binding.
    pub fn new(config: WorkflowConfig) -> AgentResult<Self> {
        let runner = Runner::from_config(&config)?;
        Ok(Self::with_runner(config, runner))
    }

    /// Build an executor over a pre-constructed runner.
    pub fn with_runner(config: WorkflowConfig, runner: Runner) -> Self {
        Self {
            config: Arc::new(config),
            runner: Arc::new(runner),
        }
    }

    /// Execute the workflow and return the final output.
    ///
    /// A configuration without a `workflow` section runs every agent once,
    /// sequentially, in declaration order.
    pub async fn execute(&self) -> AgentResult<String> {
        match &self.config.workflow {
            Some(workflow) => {
                info!(kind = %workflow.kind, "Executing workflow");
                match workflow.kind {
                    WorkflowKind::Sequential => {
                        SequentialExecutor::execute(&self.runner, &self.config, workflow).await
                    }
                    WorkflowKind::Parallel => {
                        ParallelExecutor::execute(&self.runner, &self.config, workflow).await
                    }
                    WorkflowKind::Collaborative => {
                        CollaborativeExecutor::execute(&self.runner, &self.config, workflow).await
                    }
                }
            }
            None => {
                info!("No workflow defined, running agents in declaration order");
                for agent in &self.config.agents {
                    self.runner.run_agent(agent).await?;
                }
                Ok(self.runner.context().last_output())
            }
        }
    }

    /// The run's runner, for inspecting context and shared memory after a run.
    pub fn runner(&self) -> &Runner {
        &self.runner
    }
}

pub(crate) fn lookup_agent<'a>(
    config: &'a WorkflowConfig,
    id: &str,
) -> AgentResult<&'a crate::config::AgentSpec> {
    config
        .agent(id)
        .ok_or_else(|| AgentError::AgentNotFound(id.to_string()))
}
