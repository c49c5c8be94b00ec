#![deny(unsafe_code)]

//! Configuration loading and validation for helmgen.
//!
//! Loads an optional `helmgen.toml` and validates it. Every field carries a
//! serde default, so an empty file (or no file at all) yields a usable
//! [`AppConfig`] pointing at the upstream GenAIComps / GenAIInfra repositories.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Repository whose code is turned into a chart.
    #[serde(default)]
    pub source: SourceConfig,

    /// Optional reference Helm chart repository.
    #[serde(default)]
    pub reference: ReferenceConfig,

    /// Scanner settings shared by both repositories.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Prompt text overrides.
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Chat-completion endpoint settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Repository clone/pull settings.
    #[serde(default)]
    pub vcs: VcsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The repository that is scanned for source code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Git URL cloned when the local checkout does not exist yet.
    #[serde(default = "default_source_repo_url")]
    pub repo_url: String,

    /// Local checkout path. Derived from `repo_url` when unset.
    #[serde(default)]
    pub repo_path: Option<PathBuf>,

    /// Subdirectories (relative to the checkout) to scan.
    #[serde(default = "default_code_dirs")]
    pub code_dirs: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repo_url: default_source_repo_url(),
            repo_path: None,
            code_dirs: default_code_dirs(),
        }
    }
}

impl SourceConfig {
    /// The local checkout path, explicit or derived from the URL.
    pub fn local_path(&self) -> PathBuf {
        resolve_local_path(&self.repo_url, self.repo_path.as_deref())
    }
}

fn default_source_repo_url() -> String {
    "https://github.com/opea-project/GenAIComps".to_string()
}

fn default_code_dirs() -> Vec<String> {
    vec!["comps".to_string()]
}

/// A repository holding a reference Helm chart.
///
/// The reference section is only emitted when `dirs` is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_repo_url")]
    pub repo_url: String,

    #[serde(default)]
    pub repo_path: Option<PathBuf>,

    /// Chart directories (relative to the checkout) to include.
    #[serde(default)]
    pub dirs: Vec<String>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            repo_url: default_reference_repo_url(),
            repo_path: None,
            dirs: Vec::new(),
        }
    }
}

impl ReferenceConfig {
    /// Whether a reference chart section is configured at all.
    pub fn is_enabled(&self) -> bool {
        !self.dirs.is_empty()
    }

    pub fn local_path(&self) -> PathBuf {
        resolve_local_path(&self.repo_url, self.repo_path.as_deref())
    }
}

fn default_reference_repo_url() -> String {
    "https://github.com/opea-project/GenAIInfra".to_string()
}

/// Scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob (or literal prefix) patterns for paths to skip.
    #[serde(default = "default_exclusion_patterns")]
    pub exclusion_patterns: Vec<String>,

    /// Line written before every file in the prompt.
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclusion_patterns: default_exclusion_patterns(),
            separator: default_separator(),
        }
    }
}

fn default_exclusion_patterns() -> Vec<String> {
    vec!["*/deployment".to_string()]
}

fn default_separator() -> String {
    "----".to_string()
}

/// Prompt text overrides. `None` selects the built-in wording.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub preamble: Option<String>,

    #[serde(default)]
    pub epilog: Option<String>,
}

/// Chat-completion endpoint settings.
///
/// ## TOML Example
///
/// ```toml
/// [llm]
/// endpoint = "http://localhost:8000"
/// temperature = 0.01
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible server, without the `/v1` suffix.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token. Never written back out by `config --show`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Explicit model id. When unset the first model listed by the endpoint is used.
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default)]
    pub frequency_penalty: f32,

    #[serde(default)]
    pub presence_penalty: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: None,
            temperature: default_temperature(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

fn default_temperature() -> f32 {
    0.01
}

/// Repository clone/pull settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
    /// Clone or pull the repositories before scanning.
    #[serde(default = "default_sync")]
    pub sync: bool,

    /// The `git` executable to invoke.
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            sync: default_sync(),
            git_binary: default_git_binary(),
        }
    }
}

fn default_sync() -> bool {
    true
}

fn default_git_binary() -> String {
    "git".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Derive a checkout directory name from a repository URL.
///
/// Takes the last `/`-separated segment and strips every `.git` occurrence,
/// e.g. `https://github.com/opea-project/GenAIComps.git` → `GenAIComps`.
pub fn repo_dir_from_url(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    last.replace(".git", "")
}

fn resolve_local_path(url: &str, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(repo_dir_from_url(url)),
    }
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.code_dirs.is_empty() {
            return Err(ConfigError::Validation(
                "source.code_dirs must name at least one directory".to_string(),
            ));
        }
        if self.source.repo_url.is_empty() && self.source.repo_path.is_none() {
            return Err(ConfigError::Validation(
                "source.repo_url or source.repo_path must be set".to_string(),
            ));
        }
        if self.reference.is_enabled()
            && self.reference.repo_url.is_empty()
            && self.reference.repo_path.is_none()
        {
            return Err(ConfigError::Validation(
                "reference.repo_url or reference.repo_path must be set when reference.dirs is non-empty"
                    .to_string(),
            ));
        }

        if self.scan.separator.is_empty() {
            return Err(ConfigError::Validation(
                "scan.separator must not be empty".to_string(),
            ));
        }
        if self.scan.separator.contains('\n') {
            return Err(ConfigError::Validation(
                "scan.separator must be a single line".to_string(),
            ));
        }
        if let Some(endpoint) = &self.llm.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ConfigError::Validation(format!(
                "llm.endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be in [0.0, 2.0], got {}",
                self.llm.temperature
            )));
        }
        for (name, value) in [
            ("frequency_penalty", self.llm.frequency_penalty),
            ("presence_penalty", self.llm.presence_penalty),
        ] {
            if !(-2.0..=2.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "llm.{name} must be in [-2.0, 2.0], got {value}"
                )));
            }
        }

        if self.vcs.git_binary.is_empty() {
            return Err(ConfigError::Validation(
                "vcs.git_binary must not be empty".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}
