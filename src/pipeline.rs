//! One advisory run: secret check, connection check, tool catalog, repository
//! retrieval, model verdict, report.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tracing::field::{display, Empty};
use tracing::{debug, error, info, instrument, warn, Span};

use crate::composio::connection::{self, ConnectionError, ConnectionStatus};
use crate::composio::{self, ActionExecutor, ComposioError, IntegrationService};
use crate::config::{Config, ConfigError};
use crate::decision::{self, StarOutcome};
use crate::github::{self, GithubError, GET_CONTENT_TOOL, GET_REPOSITORY_TOOL};
use crate::llm::CompletionService;
use crate::report::{self, ReportError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("Error fetching tools: {0}")]
    Catalog(#[from] ComposioError),

    #[error(transparent)]
    Github(#[from] GithubError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// How a run ended when nothing fatal happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A required secret was missing; no service was contacted
    ConfigIncomplete,
    /// No GitHub account is connected yet and the operator was shown where to
    /// finish auth
    PendingConnection,
    /// The repository lookup failed, so no verdict was asked for
    RepositoryUnavailable,
    Completed { star: StarOutcome },
}

impl RunOutcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            RunOutcome::ConfigIncomplete => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        }
    }
}

/// The remote services a run talks to.
pub struct Services<'a> {
    pub integrations: &'a dyn IntegrationService,
    pub executor: Arc<dyn ActionExecutor>,
    pub llm: &'a dyn CompletionService,
}

/// Run the whole advisory flow for the configured target and print the
/// report, also writing it to `output` when given.
#[instrument(skip_all, fields(target = Empty))]
pub async fn run(
    config: &Config,
    services: Services<'_>,
    output: Option<&Path>,
) -> Result<RunOutcome, RunError> {
    if let Err(err) = config.validate() {
        error!(error = %err, "configuration incomplete");
        return Ok(RunOutcome::ConfigIncomplete);
    }
    let target = config.target()?;
    Span::current().record("target", display(&target));
    info!(model = services.llm.model(), "environment variables found");

    info!("checking GitHub connection status");
    let status = connection::ensure_connected(
        services.integrations,
        config.integration_id(),
        &config.composio.entity_id,
        config.composio.strict_connection_check,
    )
    .await?;
    match status {
        ConnectionStatus::PendingSetup {
            redirect_url,
            required_fields,
        } => {
            debug!(fields = required_fields.len(), "connection pending operator action");
            report::print_connection_prompt(redirect_url.as_deref());
            return Ok(RunOutcome::PendingConnection);
        }
        ConnectionStatus::Connected {
            integration,
            connections,
        } => {
            debug!(%integration, connections, "GitHub connection verified");
        }
        ConnectionStatus::Unverified { reason } => {
            warn!(%reason, "continuing without a verified GitHub connection");
        }
    }

    info!(app = %config.composio.app, "fetching tools from Composio");
    let catalog = composio::fetch_catalog(services.executor, &config.composio.app)
        .await
        .inspect_err(|err| error!(error = %err, "error fetching tools"))?;
    info!(tools = catalog.len(), "retrieved GitHub tools");

    let Some(repo_tool) = catalog.find(GET_REPOSITORY_TOOL) else {
        error!(available = ?catalog.names(), "{GET_REPOSITORY_TOOL} tool not found");
        return Err(GithubError::ToolMissing(GET_REPOSITORY_TOOL).into());
    };

    info!("fetching repository metadata");
    let metadata = match github::fetch_metadata(&repo_tool, &target).await {
        Ok(metadata) => metadata,
        Err(err) => {
            error!(error = %err, "repository lookup failed");
            return Ok(RunOutcome::RepositoryUnavailable);
        }
    };
    info!(name = %metadata.name, stars = metadata.stargazers_count, "fetched repository metadata");

    let Some(content_tool) = catalog.find(GET_CONTENT_TOOL) else {
        error!(content_tools = ?catalog.names_containing("content"), "{GET_CONTENT_TOOL} tool not found");
        return Err(GithubError::ToolMissing(GET_CONTENT_TOOL).into());
    };

    info!("checking repository root files");
    let root_entries = github::list_root(&content_tool, &target)
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "could not list root directory files");
            Vec::new()
        });

    info!("getting repository README");
    let readme =
        github::resolve_readme(&content_tool, &target, &metadata, &config.readme.candidates).await;

    let outcome = decision::run(services.llm, &catalog, &target, &metadata, &readme).await;
    let star = outcome.star.clone();

    let built_report = report::build(target, metadata, root_entries, &readme, outcome);
    report::output(&built_report, output)?;
    info!("done");

    Ok(RunOutcome::Completed { star })
}
