//! Sequential workflow discipline

use std::sync::Arc;

use super::lookup_agent;
use crate::agents::core::Runner;
use crate::agents::error::AgentResult;
use crate::config::{WorkflowConfig, WorkflowSpec};

/// Sequential executor: steps run in order, each observing the accumulated
/// context of the steps before it. The first error terminates the run.
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub async fn execute(
        runner: &Arc<Runner>,
        config: &WorkflowConfig,
        workflow: &WorkflowSpec,
    ) -> AgentResult<String> {
        for step in &workflow.steps {
            let agent = lookup_agent(config, &step.agent)?;
            runner.run_agent(agent).await?;
        }

        Ok(runner.context().last_output())
    }
}
