//! Configuration builders for tests.
//!
//! Use [`TestConfigBuilder`] to create customised [`AppConfig`] values without
//! repeating boilerplate across crate boundaries. Repository sync is off by
//! default so tests never shell out to `git`.
//!
//! # Example
//!
//! ```ignore
//! let config = TestConfigBuilder::new()
//!     .source_repo(repo.path())
//!     .code_dirs(&["a"])
//!     .endpoint(server.base_url())
//!     .build();
//! ```

use std::path::Path;

use helmgen_config::AppConfig;

/// Fluent builder for [`AppConfig`] in tests.
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.vcs.sync = false;
        Self { config }
    }

    pub fn source_repo(mut self, path: &Path) -> Self {
        self.config.source.repo_path = Some(path.to_path_buf());
        self
    }

    pub fn code_dirs(mut self, dirs: &[&str]) -> Self {
        self.config.source.code_dirs = dirs.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn reference_repo(mut self, path: &Path, dirs: &[&str]) -> Self {
        self.config.reference.repo_path = Some(path.to_path_buf());
        self.config.reference.dirs = dirs.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn exclusion_patterns(mut self, patterns: &[&str]) -> Self {
        self.config.scan.exclusion_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.config.scan.separator = separator.to_string();
        self
    }

    pub fn preamble(mut self, text: &str) -> Self {
        self.config.prompt.preamble = Some(text.to_string());
        self
    }

    pub fn epilog(mut self, text: &str) -> Self {
        self.config.prompt.epilog = Some(text.to_string());
        self
    }

    pub fn endpoint(mut self, url: &str) -> Self {
        self.config.llm.endpoint = Some(url.to_string());
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.config.llm.api_key = Some(key.to_string());
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.config.llm.model = Some(model.to_string());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.llm.temperature = temperature;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
