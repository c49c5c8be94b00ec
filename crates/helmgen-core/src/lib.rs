#![deny(unsafe_code)]

//! helmgen core: repository scanning, prompt assembly, and chat completion.
//!
//! The run is strictly sequential: a [`RepoScanner`] collects text files from
//! the checked-out repositories, the [`prompt`] module serializes them into a
//! single [`PromptDocument`], and a [`ChatSession`] submits that document to
//! an OpenAI-compatible endpoint. [`Pipeline`] wires the steps together.

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`-safe, boxed future, the return type for trait
/// methods that must stay object-safe (`Box<dyn ChatClient>`).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Chat client trait, session, and the OpenAI-compatible implementation.
pub mod llm;
/// Ordered run: model discovery, repository sync, scan, assemble, submit.
pub mod pipeline;
/// Prompt document layout and default texts.
pub mod prompt;
/// Directory walking, exclusion patterns, and the extension deny-list.
pub mod scan;
/// Zeroizing storage for the endpoint API key.
pub mod secrets;
/// Clone/pull through the `git` CLI.
pub mod vcs;

pub use llm::{ChatClient, ChatSession, LlmError, OpenAiCompatClient};
pub use pipeline::{Assembly, Outcome, Pipeline, PipelineError, Section};
pub use prompt::{PromptBuilder, PromptDocument};
pub use scan::{FileRecord, PathFilter, RepoScanner, ScanError};
pub use secrets::ApiKey;
pub use vcs::{GitCli, VcsError};
