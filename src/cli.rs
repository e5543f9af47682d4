use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Multi-agent workflow orchestrator for LLM providers
#[derive(Parser, Debug, Clone)]
#[command(name = "chorus", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a workflow defined in a YAML file
    Run {
        /// Path to the workflow file
        workflow: PathBuf,
    },
    /// Validate a workflow file without executing it
    Validate {
        /// Path to the workflow file
        workflow: PathBuf,
    },
}
