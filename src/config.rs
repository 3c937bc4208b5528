use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::github::RepoRef;

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".star-advisor.toml";

/// Integration used when neither the config file nor COMPOSIO_GITHUB_ID names one.
pub const DEFAULT_INTEGRATION_ID: &str = "2a22d508-3566-44ab-a526-6b83b0619034";

pub const COMPOSIO_API_KEY: &str = "COMPOSIO_API_KEY";
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const COMPOSIO_GITHUB_ID: &str = "COMPOSIO_GITHUB_ID";
pub const COMPOSIO_BASE_URL: &str = "COMPOSIO_BASE_URL";
pub const GROQ_MODEL: &str = "GROQ_MODEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0} not found in environment variables")]
    MissingSecret(&'static str),

    #[error("Invalid repository reference '{0}', expected owner/name")]
    InvalidRepo(String),
}

/// Top-level configuration loaded from .star-advisor.toml.
///
/// Every section has defaults; only the two API keys are mandatory and they
/// normally come from the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub composio: ComposioConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    /// Repository to judge
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub readme: ReadmeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ComposioConfig {
    /// Composio API key. COMPOSIO_API_KEY wins when set.
    pub api_key: Option<String>,
    pub base_url: String,
    /// GitHub integration id. COMPOSIO_GITHUB_ID wins when set.
    pub integration_id: Option<String>,
    /// Entity new connections are initiated for
    pub entity_id: String,
    /// Application the tool catalog is scoped to
    pub app: String,
    /// Halt instead of continuing when the connection check itself fails
    pub strict_connection_check: bool,
}

impl Default for ComposioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://backend.composio.dev".to_string(),
            integration_id: None,
            entity_id: "default".to_string(),
            app: "github".to_string(),
            strict_connection_check: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Groq API key. GROQ_API_KEY wins when set.
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible chat completions API
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub owner: String,
    pub repo: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            owner: "janzheng".to_string(),
            repo: "groq-jigsawstack-template".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadmeConfig {
    /// README filenames tried in order; the first hit wins
    pub candidates: Vec<String>,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            candidates: ["README.md", "readme.md", "Readme.md", "README.MD", "README", "readme"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or defaults if the file doesn't exist,
    /// then apply environment overrides. A `.env` file is honoured first.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "loaded .env file");
        }

        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path without touching the environment.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Override file values with whatever `lookup` returns for the known
    /// environment variables. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = get(COMPOSIO_API_KEY) {
            self.composio.api_key = Some(key);
        }
        if let Some(key) = get(GROQ_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(id) = get(COMPOSIO_GITHUB_ID) {
            self.composio.integration_id = Some(id);
        }
        if let Some(url) = get(COMPOSIO_BASE_URL) {
            self.composio.base_url = url;
        }
        if let Some(model) = get(GROQ_MODEL) {
            self.llm.model = model;
        }
    }

    /// Check the required secrets, COMPOSIO_API_KEY first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_blank(&self.composio.api_key) {
            return Err(ConfigError::MissingSecret(COMPOSIO_API_KEY));
        }
        if is_blank(&self.llm.api_key) {
            return Err(ConfigError::MissingSecret(GROQ_API_KEY));
        }

        if self.composio.integration_id.is_some() {
            info!("using custom GitHub integration id");
        } else {
            info!("using default GitHub integration id");
        }
        Ok(())
    }

    /// Replace the target repository with an `owner/name` reference.
    pub fn override_target(&mut self, reference: &str) -> Result<(), ConfigError> {
        let target = RepoRef::parse(reference).ok_or_else(|| ConfigError::InvalidRepo(reference.to_string()))?;
        self.target.owner = target.owner;
        self.target.repo = target.repo;
        Ok(())
    }

    pub fn integration_id(&self) -> &str {
        self.composio
            .integration_id
            .as_deref()
            .unwrap_or(DEFAULT_INTEGRATION_ID)
    }

    /// The configured target, rejecting a blank or slashed owner or repo.
    pub fn target(&self) -> Result<RepoRef, ConfigError> {
        let TargetConfig { owner, repo } = &self.target;
        RepoRef::new(owner, repo).ok_or_else(|| ConfigError::InvalidRepo(format!("{owner}/{repo}")))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.composio.api_key.is_none());
        assert_eq!(config.composio.app, "github");
        assert_eq!(config.composio.entity_id, "default");
        assert!(!config.composio.strict_connection_check);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.integration_id(), DEFAULT_INTEGRATION_ID);
        assert_eq!(
            config.readme.candidates,
            vec!["README.md", "readme.md", "Readme.md", "README.MD", "README", "readme"]
        );
        let target = config.target().unwrap();
        assert_eq!(target.owner, "janzheng");
        assert_eq!(target.repo, "groq-jigsawstack-template");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[composio]
integration_id = "abc-123"
strict_connection_check = true

[llm]
model = "llama-3.3-70b-versatile"

[target]
owner = "rust-lang"
repo = "regex"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.integration_id(), "abc-123");
        assert!(config.composio.strict_connection_check);
        assert_eq!(config.composio.base_url, "https://backend.composio.dev");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.target.owner, "rust-lang");
        assert_eq!(config.readme.candidates.len(), 6);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("advisor.toml");
        std::fs::write(&path, "[target]\nowner = \"y\"\nrepo = \"x\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        let target = config.target().unwrap();
        assert_eq!(target.owner, "y");
        assert_eq!(target.repo, "x");
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[target\nowner = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: Config = toml::from_str("[composio]\napi_key = \"from-file\"\n").unwrap();
        config.apply_env(env(&[
            (COMPOSIO_API_KEY, "from-env"),
            (GROQ_API_KEY, "gsk"),
            (COMPOSIO_GITHUB_ID, "custom-id"),
        ]));
        assert_eq!(config.composio.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.llm.api_key.as_deref(), Some("gsk"));
        assert_eq!(config.integration_id(), "custom-id");
    }

    #[test]
    fn test_blank_env_values_ignored() {
        let mut config: Config = toml::from_str("[composio]\napi_key = \"from-file\"\n").unwrap();
        config.apply_env(env(&[(COMPOSIO_API_KEY, "  ")]));
        assert_eq!(config.composio.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_validate_reports_composio_key_first() {
        let config = Config::default();
        match config.validate() {
            Err(ConfigError::MissingSecret(name)) => assert_eq!(name, COMPOSIO_API_KEY),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_reports_missing_groq_key() {
        let mut config = Config::default();
        config.apply_env(env(&[(COMPOSIO_API_KEY, "ck")]));
        match config.validate() {
            Err(ConfigError::MissingSecret(name)) => assert_eq!(name, GROQ_API_KEY),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_ok_with_both_keys() {
        let mut config = Config::default();
        config.apply_env(env(&[(COMPOSIO_API_KEY, "ck"), (GROQ_API_KEY, "gk")]));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_override_target() {
        let mut config = Config::default();
        config.override_target("tokio-rs/tracing").unwrap();
        let target = config.target().unwrap();
        assert_eq!(target.owner, "tokio-rs");
        assert_eq!(target.repo, "tracing");
        assert!(config.override_target("no-slash").is_err());
        assert!(config.override_target("a/b/c").is_err());
    }

    #[test]
    fn test_blank_target_owner_is_rejected() {
        let config: Config = toml::from_str("[target]\nowner = \"\"\nrepo = \"x\"\n").unwrap();
        match config.target() {
            Err(ConfigError::InvalidRepo(reference)) => assert_eq!(reference, "/x"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
