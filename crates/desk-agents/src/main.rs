use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use desk_agents::collaborators::{AgentEndpoint, HttpComplexity, HttpEstimator, HttpHistorical};
use desk_agents::{check_agents, Collaborators, PipelineOrchestrator, ServiceConfig, TicketInput};
use routing::RoutingService;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Registry TOML file (overrides DESK_REGISTRY_PATH)
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print desk status as JSON
    Status,
    /// Check each agent's /health and print a readiness report
    Check,
    /// Route one ticket through the pipeline and print the result and queue
    Assign {
        /// Ticket JSON file
        #[arg(long)]
        ticket: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServiceConfig::from_env()?;
    if cli.registry.is_some() {
        config.registry_path = cli.registry;
    }

    let registry = config.registry_config()?;
    let service = RoutingService::from_config(&registry)
        .context("Invalid desk registry")?
        .shared();

    match cli.command {
        Command::Status => {
            let status = service.desk_status()?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Check => {
            let report = check_agents(&agent_endpoints(&config)?).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Assign { ticket } => {
            let content = std::fs::read_to_string(&ticket)
                .with_context(|| format!("Failed to read ticket {}", ticket.display()))?;
            let input: TicketInput = serde_json::from_str(&content)
                .with_context(|| format!("Invalid ticket JSON in {}", ticket.display()))?;

            info!(
                historical = %config.historical_url,
                estimator = %config.estimator_url,
                complexity = %config.complexity_url,
                timeout = ?config.collaborator_timeout,
                "Running ticket pipeline"
            );
            let collaborators = http_collaborators(&config)?;
            let orchestrator =
                PipelineOrchestrator::new(service, collaborators, config.collaborator_timeout);
            let result = orchestrator.run(input).await?;
            let queue = orchestrator.service().list_queue()?;

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "result": result,
                    "queue": queue,
                }))?
            );
        }
    }

    Ok(())
}

fn agent_endpoints(config: &ServiceConfig) -> Result<[(&'static str, AgentEndpoint); 3]> {
    let endpoint = |url: &str| {
        AgentEndpoint::new(url, config.collaborator_timeout)
            .with_context(|| format!("Failed to build HTTP client for {}", url))
    };
    Ok([
        ("historical", endpoint(&config.historical_url)?),
        ("estimator", endpoint(&config.estimator_url)?),
        ("complexity", endpoint(&config.complexity_url)?),
    ])
}

fn http_collaborators(config: &ServiceConfig) -> Result<Collaborators> {
    let [(_, historical), (_, estimator), (_, complexity)] = agent_endpoints(config)?;
    Ok(Collaborators::new(
        Arc::new(HttpHistorical::new(historical)),
        Arc::new(HttpEstimator::new(estimator)),
        Arc::new(HttpComplexity::new(complexity)),
    ))
}
