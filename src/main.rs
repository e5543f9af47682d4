use clap::Parser;
use tracing::info;

use chorus::agents::orchestration::Executor;
use chorus::cli::{Cli, Commands};
use chorus::config::WorkflowConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    let result = match &cli.command {
        Commands::Run { workflow } => run(workflow, cli.verbose).await,
        Commands::Validate { workflow } => validate(workflow, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(path: &std::path::Path, verbose: bool) -> anyhow::Result<()> {
    if verbose {
        info!(workflow = %path.display(), "Running workflow");
    }

    let config = WorkflowConfig::from_file(path)?;

    if verbose {
        info!(agents = config.agents.len(), "Loaded configuration");
    }

    let executor = Executor::new(config)?;
    let output = executor.execute().await?;

    println!("\n--- Final Output ---");
    println!("{}", output);

    Ok(())
}

fn validate(path: &std::path::Path, verbose: bool) -> anyhow::Result<()> {
    if verbose {
        info!(workflow = %path.display(), "Validating workflow");
    }

    let config = WorkflowConfig::from_file(path)?;

    println!("Workflow is valid");
    println!("  Agents: {}", config.agents.len());
    if let Some(workflow) = &config.workflow {
        println!("  Type: {}", workflow.kind);
        match workflow.kind {
            chorus::config::WorkflowKind::Sequential => {
                println!("  Steps: {}", workflow.steps.len())
            }
            chorus::config::WorkflowKind::Parallel => {
                println!("  Branches: {}", workflow.branches.len())
            }
            chorus::config::WorkflowKind::Collaborative => {
                println!("  Collaborators: {}", workflow.collaborators.len())
            }
        }
    }

    Ok(())
}
