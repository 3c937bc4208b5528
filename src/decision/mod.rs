pub mod prompt;
pub mod verdict;

pub use verdict::{parse_response, Action, Decision, Verdict};

use tracing::{error, info, info_span, instrument, warn, Instrument};

use crate::composio::ToolCatalog;
use crate::github::{self, ReadmeContent, RepoRef, RepositoryMetadata, STAR_REPOSITORY_TOOL};
use crate::llm::CompletionService;

/// What happened to the star action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StarOutcome {
    /// The verdict was not STAR, or the model could not be asked
    NotRequested,
    Starred { response: String },
    ToolMissing,
    Failed { error: String },
}

/// Everything the decision step produced, for the report.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Trimmed model response; `None` when the completion call failed
    pub response: Option<String>,
    pub decision: Option<Decision>,
    pub model_error: Option<String>,
    pub star: StarOutcome,
}

/// Ask the model about the repository, parse the answer, and star the
/// repository if the verdict says so.
///
/// Nothing here is fatal: a failed completion skips the star action, and a
/// missing or failing star tool is reported in the outcome.
#[instrument(skip_all, fields(target = %target))]
pub async fn run(
    llm: &dyn CompletionService,
    catalog: &ToolCatalog,
    target: &RepoRef,
    metadata: &RepositoryMetadata,
    readme: &ReadmeContent,
) -> PipelineOutcome {
    let prompt = prompt::build_analysis_prompt(metadata, readme);

    info!(model = llm.model(), "asking LLM to analyze the repository");
    let completion = match llm
        .complete(&prompt)
        .instrument(info_span!("complete"))
        .await
    {
        Ok(completion) => completion,
        Err(err) => {
            error!(error = %err, "LLM analysis failed, skipping star action");
            return PipelineOutcome {
                response: None,
                decision: None,
                model_error: Some(err.to_string()),
                star: StarOutcome::NotRequested,
            };
        }
    };

    let response = completion.content.trim().to_string();
    let decision = parse_response(&response);
    info!(
        action = %decision.verdict.action(),
        rule = ?decision.rule,
        reason = decision.verdict.reason().unwrap_or(""),
        "parsed LLM decision"
    );

    let star = match decision.verdict {
        Verdict::Star { .. } => star_repository(catalog, target).await,
        Verdict::Skip { .. } => {
            info!("LLM recommends not starring this repository");
            StarOutcome::NotRequested
        }
        Verdict::Unparseable => {
            warn!("no clear STAR decision found, skipping star action");
            StarOutcome::NotRequested
        }
    };

    PipelineOutcome {
        response: Some(response),
        decision: Some(decision),
        model_error: None,
        star,
    }
}

/// Invoke the star tool once with the same owner/repo used for retrieval.
///
/// A transport success still counts as a failure when the result envelope is
/// marked unsuccessful or carries no data.
#[instrument(skip(catalog))]
pub async fn star_repository(catalog: &ToolCatalog, target: &RepoRef) -> StarOutcome {
    let Some(tool) = catalog.find(STAR_REPOSITORY_TOOL) else {
        error!(tool = STAR_REPOSITORY_TOOL, "star tool not found");
        return StarOutcome::ToolMissing;
    };

    let result = match tool.invoke(&target.to_input()).await {
        Ok(response) => github::response_data(&response).map(|_| response),
        Err(err) => Err(err.into()),
    };
    match result {
        Ok(response) => {
            info!("repository starred");
            StarOutcome::Starred { response }
        }
        Err(err) => {
            error!(error = %err, "failed to star repository");
            StarOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}
