//! # Chorus - Multi-Agent Workflow Orchestrator
//!
//! Chorus executes declarative multi-agent workflows on top of LLM
//! providers. A YAML document describes agents, the models they use, and a
//! workflow topology; the orchestrator runs the topology, routing prompts
//! and intermediate results between agents until a final output is produced.
//!
//! ## Workflow disciplines
//!
//! - **Sequential**: agents run in order, each observing prior outputs
//! - **Parallel**: branches run concurrently, with an optional join agent
//! - **Collaborative**: agents exchange direct and broadcast messages over a
//!   shared pub/sub channel, terminating via a `<DONE/>` signal
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use chorus::agents::orchestration::Executor;
//! use chorus::config::WorkflowConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = WorkflowConfig::from_file("workflow.yaml")?;
//!     let executor = Executor::new(config)?;
//!     let output = executor.execute().await?;
//!     println!("{}", output);
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod cli;
pub mod config;
