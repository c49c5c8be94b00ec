//! End-to-end run: resolve model, sync repositories, scan, assemble, submit.
//!
//! The order is fixed so that a misconfigured endpoint is reported before
//! any repository is touched:
//!
//! 1. build the [`ChatSession`] (model discovery)
//! 2. clone or pull the source and reference repositories
//! 3. scan the source section, then the reference section
//! 4. assemble the prompt and issue one completion
//!
//! A section that yields no files ends the run early with
//! [`Outcome::NothingToSend`]; that is a warning, not an error.

use std::fmt;

use helmgen_config::AppConfig;
use tracing::{info, warn};

use crate::llm::{ChatClient, ChatResponse, ChatSession, LlmError, Sampling};
use crate::prompt::{self, PromptBuilder, PromptDocument};
use crate::scan::{FileRecord, PathFilter, RepoScanner, ScanError};
use crate::vcs::{GitCli, VcsError};

/// Which part of the prompt a repository feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Source,
    Reference,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Source => write!(f, "source"),
            Section::Reference => write!(f, "reference"),
        }
    }
}

/// Result of scanning and assembling.
#[derive(Debug, Clone)]
pub enum Assembly {
    Ready(PromptDocument),
    /// The named section produced no files.
    Empty(Section),
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub enum Outcome {
    Completed(ChatResponse),
    /// A section produced no files; the chat endpoint was not called.
    NothingToSend(Section),
}

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

impl PipelineError {
    /// Whether a later identical run might succeed. Everything else needs a
    /// change to configuration or repository contents.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::Scan(ScanError::Read { .. }) => true,
            PipelineError::Scan(_) => false,
            PipelineError::Llm(e) => e.is_transient(),
            PipelineError::Vcs(e) => e.is_transient(),
        }
    }
}

/// A configured run.
#[derive(Debug)]
pub struct Pipeline {
    config: AppConfig,
    scanner: RepoScanner,
    git: Option<GitCli>,
    log_prompt: bool,
}

impl Pipeline {
    /// Compile the exclusion patterns and prepare the run.
    pub fn new(config: AppConfig) -> Result<Self, PipelineError> {
        let filter = PathFilter::new(config.scan.exclusion_patterns.iter().cloned())?;
        let git = config
            .vcs
            .sync
            .then(|| GitCli::new(config.vcs.git_binary.clone()));
        Ok(Self {
            config,
            scanner: RepoScanner::new(filter),
            git,
            log_prompt: false,
        })
    }

    /// Log the full prompt before it is sent.
    pub fn with_prompt_logging(mut self, enabled: bool) -> Self {
        self.log_prompt = enabled;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Clone or pull the source repository and, when configured, the
    /// reference repository. No-op when sync is disabled.
    pub async fn sync_repositories(&self) -> Result<(), PipelineError> {
        let Some(git) = &self.git else {
            info!("repository sync disabled");
            return Ok(());
        };
        let source = &self.config.source;
        let action = git.update_repo(&source.repo_url, &source.local_path()).await?;
        info!(section = %Section::Source, ?action, "repository synced");

        let reference = &self.config.reference;
        if reference.is_enabled() {
            let action = git
                .update_repo(&reference.repo_url, &reference.local_path())
                .await?;
            info!(section = %Section::Reference, ?action, "repository synced");
        }
        Ok(())
    }

    /// Scan one section's repository. The reference section is empty when
    /// no reference dirs are configured.
    pub fn scan_section(&self, section: Section) -> Result<Vec<FileRecord>, PipelineError> {
        let records = match section {
            Section::Source => {
                let source = &self.config.source;
                self.scanner.scan(&source.local_path(), &source.code_dirs)?
            }
            Section::Reference => {
                let reference = &self.config.reference;
                self.scanner.scan(&reference.local_path(), &reference.dirs)?
            }
        };
        Ok(records)
    }

    /// Scan both sections and assemble the prompt.
    pub fn assemble(&self) -> Result<Assembly, PipelineError> {
        let has_reference = self.config.reference.is_enabled();
        let prompt_config = &self.config.prompt;

        let records = self.scan_section(Section::Source)?;
        if records.is_empty() {
            warn!(
                "No files were processed. Please check the exclusion patterns or the code repository contents."
            );
            return Ok(Assembly::Empty(Section::Source));
        }

        let mut builder = PromptBuilder::new(self.config.scan.separator.clone());
        builder.section(
            &prompt::source_preamble(prompt_config.preamble.as_deref(), has_reference),
            &records,
        );

        if has_reference {
            let records = self.scan_section(Section::Reference)?;
            if records.is_empty() {
                warn!(
                    "No files were processed. Please check the exclusion patterns or the helm repository contents."
                );
                return Ok(Assembly::Empty(Section::Reference));
            }
            builder.section(&prompt::reference_preamble(), &records);
        }

        let document = builder.finish(prompt::epilog(prompt_config.epilog.as_deref()));
        info!(
            files = document.file_count(),
            bytes = document.len(),
            "prompt assembled"
        );
        Ok(Assembly::Ready(document))
    }

    /// Sync, assemble, and submit through an already-connected session.
    pub async fn generate(&self, session: &ChatSession) -> Result<Outcome, PipelineError> {
        self.sync_repositories().await?;

        let document = match self.assemble()? {
            Assembly::Ready(document) => document,
            Assembly::Empty(section) => return Ok(Outcome::NothingToSend(section)),
        };

        info!(model = session.model(), "calling LLM with the processed source code");
        if self.log_prompt {
            info!("content to LLM:\n{document}");
        }

        let response = session.complete(document.as_str()).await?;
        info!(finish_reason = %response.finish_reason, "LLM response received");
        info!("response content:\n{}", response.content());
        info!(usage = %response.usage, "usage metadata");
        Ok(Outcome::Completed(response))
    }

    /// Full run: connect `client` (resolving the model), then [`generate`](Self::generate).
    pub async fn run(&self, client: Box<dyn ChatClient>) -> Result<Outcome, PipelineError> {
        let llm = &self.config.llm;
        let session = ChatSession::connect(client, llm.model.as_deref(), Sampling::from(llm)).await?;
        self.generate(&session).await
    }
}
