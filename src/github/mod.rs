pub mod types;

pub use types::{
    EntryKind, ReadmeContent, ReadmeSource, RepoRef, RepositoryMetadata, RootEntry,
};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::composio::{ComposioError, Tool};
use types::{ContentEntryPayload, RepositoryPayload};

pub const GET_REPOSITORY_TOOL: &str = "GITHUB_GET_A_REPOSITORY";
pub const GET_CONTENT_TOOL: &str = "GITHUB_GET_REPOSITORY_CONTENT";
pub const STAR_REPOSITORY_TOOL: &str = "GITHUB_STAR_A_REPOSITORY_FOR_THE_AUTHENTICATED_USER";

/// Characters of README shown in the log preview.
const PREVIEW_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("{0} tool not found")]
    ToolMissing(&'static str),

    #[error("GitHub tool call failed: {0}")]
    Tool(#[from] ComposioError),

    #[error("Failed to decode tool response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Tool response carried no data: {0}")]
    NoData(String),

    #[error("Tool reported failure: {0}")]
    Unsuccessful(String),

    #[error("Invalid base64 file content: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Pull the `data` payload out of a raw tool result.
///
/// Fails when the envelope marks the call unsuccessful (some actions spell the
/// flag `successfull`) or carries no data.
pub(crate) fn response_data(raw: &str) -> Result<Value, GithubError> {
    let mut envelope: Value = serde_json::from_str(raw)?;
    let error = envelope.get("error").and_then(Value::as_str).map(str::to_string);

    let successful = envelope
        .get("successful")
        .or_else(|| envelope.get("successfull"))
        .and_then(Value::as_bool);
    if successful == Some(false) {
        return Err(GithubError::Unsuccessful(
            error.unwrap_or_else(|| "no error given".to_string()),
        ));
    }

    let data = envelope.get_mut("data").map(Value::take);
    match data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(GithubError::NoData(
            error.unwrap_or_else(|| "empty data field".to_string()),
        )),
    }
}

/// Fetch repository metadata through the repository-get tool.
#[instrument(skip(tool), fields(tool = tool.name()))]
pub async fn fetch_metadata(tool: &Tool<'_>, target: &RepoRef) -> Result<RepositoryMetadata, GithubError> {
    let raw = tool.invoke(&target.to_input()).await?;
    let data = response_data(&raw)?;
    let payload: RepositoryPayload = serde_json::from_value(data)?;
    let metadata = RepositoryMetadata::from(payload);
    debug!(name = %metadata.name, stars = metadata.stargazers_count, "received repository metadata");
    Ok(metadata)
}

/// List the repository root. Informational only; callers log failures and move on.
#[instrument(skip(tool))]
pub async fn list_root(tool: &Tool<'_>, target: &RepoRef) -> Result<Vec<RootEntry>, GithubError> {
    let raw = tool.invoke(&target.path_input("")).await?;
    match response_data(&raw)? {
        Value::Array(items) => {
            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                let entry: ContentEntryPayload = serde_json::from_value(item)?;
                entries.push(RootEntry::from(entry));
            }
            Ok(entries)
        }
        _ => Ok(Vec::new()),
    }
}

/// Fetch one file and decode its base64 `content`. `Ok(None)` means the call
/// worked but there was nothing to decode.
async fn fetch_file(tool: &Tool<'_>, target: &RepoRef, path: &str) -> Result<Option<String>, GithubError> {
    let raw = tool.invoke(&target.path_input(path)).await?;
    let data = response_data(&raw)?;
    match data.get("content").and_then(Value::as_str) {
        Some(encoded) if !encoded.is_empty() => Ok(Some(decode_content(encoded)?)),
        _ => Ok(None),
    }
}

/// Decode GitHub's base64 file content, which wraps lines with `\n`.
pub fn decode_content(encoded: &str) -> Result<String, GithubError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64.decode(compact)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Try each candidate filename in order and return the first README found.
///
/// Never fails: when no candidate yields content the README is synthesized
/// from `metadata`.
#[instrument(skip(tool, metadata, candidates))]
pub async fn resolve_readme(
    tool: &Tool<'_>,
    target: &RepoRef,
    metadata: &RepositoryMetadata,
    candidates: &[String],
) -> ReadmeContent {
    for candidate in candidates {
        debug!(candidate = %candidate, "trying README candidate");
        match fetch_file(tool, target, candidate).await {
            Ok(Some(text)) => {
                let preview: String = text.chars().take(PREVIEW_CHARS).collect();
                info!(candidate = %candidate, %preview, "found README");
                return ReadmeContent {
                    source: ReadmeSource::Found(candidate.clone()),
                    text,
                };
            }
            Ok(None) => debug!(candidate = %candidate, "README candidate has no content"),
            Err(err) => debug!(candidate = %candidate, error = %err, "README candidate not found"),
        }
    }

    warn!("no README file found in any common format");
    ReadmeContent {
        source: ReadmeSource::Synthesized,
        text: synthesize_readme(metadata),
    }
}

/// Stand-in README built from what the metadata already says.
pub fn synthesize_readme(metadata: &RepositoryMetadata) -> String {
    format!(
        "Repository: {}\nDescription: {}\nLanguage: {}\nNote: No README file found in the repository.",
        metadata.name,
        metadata.description.as_deref().unwrap_or("No description provided"),
        metadata.language.as_deref().unwrap_or("Not specified"),
    )
}
