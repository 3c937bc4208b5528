use serde::Deserialize;
use serde_json::{json, Value};

/// Owner and name of the repository being judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Build a reference from its halves. Both must be non-empty once trimmed
    /// and neither may contain a slash.
    pub fn new(owner: &str, repo: &str) -> Option<RepoRef> {
        let (owner, repo) = (owner.trim(), repo.trim());
        if owner.is_empty() || repo.is_empty() || owner.contains('/') || repo.contains('/') {
            return None;
        }
        Some(RepoRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Parse `owner/name` with exactly one slash.
    pub fn parse(reference: &str) -> Option<RepoRef> {
        let (owner, repo) = reference.trim().split_once('/')?;
        RepoRef::new(owner, repo)
    }

    /// Tool input addressing the repository itself.
    pub fn to_input(&self) -> Value {
        json!({ "owner": self.owner, "repo": self.repo })
    }

    /// Tool input addressing one path inside the repository.
    pub fn path_input(&self, path: &str) -> Value {
        json!({ "owner": self.owner, "repo": self.repo, "path": path })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Repository facts used for the prompt and the report.
#[derive(Debug, Clone)]
pub struct RepositoryMetadata {
    pub name: String,
    pub owner_login: String,
    pub description: Option<String>,
    /// Primary language as detected by GitHub
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub created_at: String,
    pub html_url: String,
}

/// Shape of the `data` field returned by the repository-get tool.
#[derive(Debug, Deserialize)]
pub(crate) struct RepositoryPayload {
    pub name: String,
    pub owner: OwnerPayload,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerPayload {
    pub login: String,
}

impl From<RepositoryPayload> for RepositoryMetadata {
    fn from(payload: RepositoryPayload) -> Self {
        Self {
            name: payload.name,
            owner_login: payload.owner.login,
            description: payload.description.filter(|d| !d.is_empty()),
            language: payload.language.filter(|l| !l.is_empty()),
            stargazers_count: payload.stargazers_count,
            forks_count: payload.forks_count,
            created_at: payload.created_at,
            html_url: payload.html_url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// One item of the repository root listing.
#[derive(Debug, Clone)]
pub struct RootEntry {
    pub name: String,
    pub kind: EntryKind,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentEntryPayload {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl From<ContentEntryPayload> for RootEntry {
    fn from(payload: ContentEntryPayload) -> Self {
        let kind = match payload.kind.as_str() {
            "file" => EntryKind::File,
            "dir" => EntryKind::Dir,
            _ => EntryKind::Other,
        };
        Self {
            name: payload.name,
            kind,
        }
    }
}

/// Where the README text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadmeSource {
    /// Decoded from this candidate filename
    Found(String),
    /// Built from repository metadata because no candidate matched
    Synthesized,
}

#[derive(Debug, Clone)]
pub struct ReadmeContent {
    pub source: ReadmeSource,
    pub text: String,
}
