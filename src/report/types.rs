use crate::decision::PipelineOutcome;
use crate::github::{ReadmeSource, RepoRef, RepositoryMetadata, RootEntry};

/// Everything one run learned, in the order it is narrated.
#[derive(Debug)]
pub struct Report {
    /// Repository as addressed in tool calls
    pub target: RepoRef,
    pub metadata: RepositoryMetadata,
    /// Root listing; empty when it could not be fetched
    pub root_entries: Vec<RootEntry>,
    pub readme_source: ReadmeSource,
    pub outcome: PipelineOutcome,
}

impl Report {
    pub fn readme_label(&self) -> String {
        match &self.readme_source {
            ReadmeSource::Found(name) => name.clone(),
            ReadmeSource::Synthesized => "none found (summary built from metadata)".to_string(),
        }
    }
}
