mod composio;
mod config;
mod decision;
mod github;
mod llm;
mod pipeline;
mod report;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use composio::ComposioClient;
use llm::GroqClient;
use pipeline::Services;

/// Star Advisor: asks an LLM whether a GitHub repository deserves a star
/// and stars it through Composio's GitHub tools when the answer is yes.
#[derive(Parser, Debug)]
#[command(name = "star-advisor", version, about)]
struct Cli {
    /// Config file (defaults to .star-advisor.toml in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repository to judge as owner/name, overriding the configured target
    #[arg(short, long)]
    repo: Option<String>,

    /// Also write the report as markdown to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("star_advisor=info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = config::Config::load(cli.config.as_deref())?;
    if let Some(reference) = cli.repo.as_deref() {
        config.override_target(reference)?;
    }

    let composio_key = config.composio.api_key.clone().unwrap_or_default();
    let groq_key = config.llm.api_key.clone().unwrap_or_default();
    let client = Arc::new(ComposioClient::new(&config.composio, &composio_key));
    let llm = GroqClient::new(&config.llm, &groq_key);

    let services = Services {
        integrations: client.as_ref(),
        executor: client.clone(),
        llm: &llm,
    };
    let outcome = pipeline::run(&config, services, cli.output.as_deref()).await?;
    Ok(outcome.exit_code())
}
