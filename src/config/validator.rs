//! Structural validation of workflow configurations

use std::collections::HashSet;

use thiserror::Error;

use super::{WorkflowConfig, WorkflowKind, WorkflowSpec};

/// A single validation failure
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cross-reference error: {0}")]
    CrossReference(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

/// Validates a parsed workflow configuration, collecting every failure.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &WorkflowConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if config.agents.is_empty() {
            errors.push(ValidationError::MissingField("agents".to_string()));
        }

        let mut agent_ids = HashSet::new();
        for (idx, agent) in config.agents.iter().enumerate() {
            if agent.id.is_empty() {
                errors.push(ValidationError::MissingField(format!("agents[{}].id", idx)));
                continue;
            }
            if !agent_ids.insert(agent.id.as_str()) {
                errors.push(ValidationError::Duplicate(format!(
                    "agent id '{}'",
                    agent.id
                )));
            }
            if agent.model.is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "agents[{}].model",
                    idx
                )));
            } else if !config.models.is_empty() && !config.models.contains_key(&agent.model) {
                errors.push(ValidationError::CrossReference(format!(
                    "agent '{}' references unknown model '{}'",
                    agent.id, agent.model
                )));
            }
        }

        for agent in &config.agents {
            for listened in &agent.listens_to {
                if !agent_ids.contains(listened.as_str()) {
                    errors.push(ValidationError::CrossReference(format!(
                        "agent '{}' listens_to unknown agent '{}'",
                        agent.id, listened
                    )));
                }
            }
        }

        if let Some(workflow) = &config.workflow {
            Self::validate_workflow(workflow, &agent_ids, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_workflow(
        workflow: &WorkflowSpec,
        agent_ids: &HashSet<&str>,
        errors: &mut Vec<ValidationError>,
    ) {
        for step in &workflow.steps {
            if !agent_ids.contains(step.agent.as_str()) {
                errors.push(ValidationError::CrossReference(format!(
                    "unknown agent in steps: '{}'",
                    step.agent
                )));
            }
        }

        for branch in &workflow.branches {
            if !agent_ids.contains(branch.as_str()) {
                errors.push(ValidationError::CrossReference(format!(
                    "unknown agent in branches: '{}'",
                    branch
                )));
            }
        }

        if let Some(then) = &workflow.then {
            if !agent_ids.contains(then.agent.as_str()) {
                errors.push(ValidationError::CrossReference(format!(
                    "unknown agent in then: '{}'",
                    then.agent
                )));
            }
        }

        for collaborator in &workflow.collaborators {
            if !agent_ids.contains(collaborator.as_str()) {
                errors.push(ValidationError::CrossReference(format!(
                    "unknown agent in collaborators: '{}'",
                    collaborator
                )));
            }
        }

        match workflow.kind {
            WorkflowKind::Sequential => {
                if workflow.steps.is_empty() {
                    errors.push(ValidationError::MissingField("workflow.steps".to_string()));
                }
            }
            WorkflowKind::Parallel => {
                if workflow.branches.is_empty() {
                    errors.push(ValidationError::MissingField(
                        "workflow.branches".to_string(),
                    ));
                }
            }
            WorkflowKind::Collaborative => {
                if workflow.collaborators.is_empty() {
                    errors.push(ValidationError::MissingField(
                        "workflow.collaborators".to_string(),
                    ));
                }
            }
        }
    }
}
