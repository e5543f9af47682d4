use std::fs;

use chorus::config::{ProviderKind, WorkflowConfig, WorkflowKind};
use tempfile::TempDir;

#[test]
fn test_load_sequential_workflow_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("workflow.yaml");

    let yaml = r#"
agents:
  - id: researcher
    model: claude
    role: Researcher
    instruction: Research the topic thoroughly.
  - id: writer
    model: claude
    goal: Write a summary of the research.
models:
  claude:
    provider: anthropic
    model: claude-sonnet-4-20250514
    max_tokens: 2048
workflow:
  type: sequential
  steps:
    - agent: researcher
    - agent: writer
"#;
    fs::write(&path, yaml)?;

    let config = WorkflowConfig::from_file(&path)?;

    assert_eq!(config.agents.len(), 2);
    assert_eq!(config.agents[0].id, "researcher");
    assert_eq!(config.agents[0].prompt(), "Research the topic thoroughly.");
    assert_eq!(config.agents[1].prompt(), "Write a summary of the research.");

    let model = &config.models["claude"];
    assert_eq!(model.provider, ProviderKind::Anthropic);
    assert_eq!(model.max_tokens, Some(2048));

    let workflow = config.workflow.unwrap();
    assert_eq!(workflow.kind, WorkflowKind::Sequential);
    assert_eq!(workflow.steps.len(), 2);

    Ok(())
}

#[test]
fn test_load_parallel_workflow_with_join() -> anyhow::Result<()> {
    let yaml = r#"
agents:
  - id: optimist
    model: local
    goal: Argue for the proposal.
  - id: pessimist
    model: local
    goal: Argue against the proposal.
  - id: judge
    model: local
    goal: Weigh both arguments and decide.
models:
  local:
    provider: ollama
    model: llama3
    endpoint: http://localhost:11434
workflow:
  type: parallel
  branches: [optimist, pessimist]
  then:
    agent: judge
"#;

    let config = WorkflowConfig::from_yaml(yaml)?;
    let workflow = config.workflow.unwrap();

    assert_eq!(workflow.kind, WorkflowKind::Parallel);
    assert_eq!(workflow.branches, vec!["optimist", "pessimist"]);
    assert_eq!(workflow.then.unwrap().agent, "judge");

    Ok(())
}

#[test]
fn test_load_collaborative_workflow() -> anyhow::Result<()> {
    let yaml = r#"
agents:
  - id: architect
    model: local
    instruction: Propose a design.
    can_broadcast: true
    outputs: [design]
  - id: reviewer
    model: local
    instruction: Review the design.
    listens_to: [architect]
    max_turns: 3
models:
  local:
    provider: ollama
    model: llama3
workflow:
  type: collaborative
  collaborators: [architect, reviewer]
"#;

    let config = WorkflowConfig::from_yaml(yaml)?;

    let architect = config.agent("architect").unwrap();
    assert!(architect.can_broadcast);
    assert_eq!(architect.outputs, vec!["design"]);

    let reviewer = config.agent("reviewer").unwrap();
    assert_eq!(reviewer.listens_to, vec!["architect"]);
    assert_eq!(reviewer.max_turns, 3);

    let workflow = config.workflow.unwrap();
    assert_eq!(workflow.kind, WorkflowKind::Collaborative);
    assert_eq!(workflow.max_turns, 10);

    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() {
    let yaml = r#"
agents:
  - id: a
    model: local
  - id: a
    model: local
models:
  local:
    provider: ollama
    model: llama3
workflow:
  type: sequential
  steps:
    - agent: ghost
"#;

    let err = WorkflowConfig::from_yaml(yaml).unwrap_err().to_string();
    assert!(err.contains("invalid workflow configuration"));
    assert!(err.contains("'a'"));
    assert!(err.contains("ghost"));
}

#[test]
fn test_unknown_workflow_type_is_rejected() {
    let yaml = r#"
agents:
  - id: a
    model: local
models:
  local:
    provider: ollama
    model: llama3
workflow:
  type: recursive
"#;

    assert!(WorkflowConfig::from_yaml(yaml).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.yaml");
    assert!(WorkflowConfig::from_file(&missing).is_err());
}
