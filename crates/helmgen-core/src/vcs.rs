//! Repository sync through the `git` command-line client.
//!
//! A missing checkout is cloned; an existing one is updated with
//! `git pull origin`. Failures are not retried.

use std::path::Path;
use std::process::Output;

use tokio::process::Command;
use tracing::info;

/// Errors from repository sync.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

impl VcsError {
    /// A missing binary needs configuration; a failing command (network,
    /// remote hiccup) may succeed on a later run.
    pub fn is_transient(&self) -> bool {
        matches!(self, VcsError::Failed { .. })
    }
}

/// What [`GitCli::update_repo`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Cloned,
    Pulled,
}

/// Thin wrapper around the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
}

impl GitCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Clone `url` into `path`, or pull from `origin` when `path` exists.
    pub async fn update_repo(&self, url: &str, path: &Path) -> Result<SyncAction, VcsError> {
        if path.exists() {
            info!(path = %path.display(), "updating repository");
            self.run(
                self.pull_command(path),
                format!("git -C {} pull origin", path.display()),
            )
            .await?;
            Ok(SyncAction::Pulled)
        } else {
            info!(%url, path = %path.display(), "cloning repository");
            self.run(
                self.clone_command(url, path),
                format!("git clone {url} {}", path.display()),
            )
            .await?;
            Ok(SyncAction::Cloned)
        }
    }

    fn clone_command(&self, url: &str, path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("clone").arg(url).arg(path);
        cmd
    }

    fn pull_command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-C").arg(path).args(["pull", "origin"]);
        cmd
    }

    async fn run(&self, mut cmd: Command, display: String) -> Result<Output, VcsError> {
        let output = cmd
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| VcsError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(VcsError::Failed {
                command: display,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}
