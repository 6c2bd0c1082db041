//! Local git operations, delegated to the `git` executable.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, trace};

/// What is on disk at a repository's local path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalStatus {
    /// The path exists
    pub exists: bool,
    /// The path contains a `.git` entry
    pub is_git_repo: bool,
    /// Checked-out branch (`HEAD` when detached)
    pub current_branch: Option<String>,
    /// `git status --porcelain` reported anything
    pub has_changes: bool,
}

impl LocalStatus {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn is_cloned(&self) -> bool {
        self.exists && self.is_git_repo
    }
}

#[derive(Debug, Error)]
pub enum GitError {
    #[error("`{command}` failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("failed to run git: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Git operations used by the list and clone commands
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitOperations: Send + Sync {
    /// Inspect the local path; a missing path is not an error
    async fn repository_status(&self, path: &Path) -> Result<LocalStatus, GitError>;

    /// Clone `url` into `target`, creating parent directories first
    async fn clone_repository(&self, url: &str, target: &Path) -> Result<(), GitError>;

    /// Pull the current branch of the clone at `path`
    async fn pull_repository(&self, path: &Path) -> Result<(), GitError>;
}

/// [`GitOperations`] backed by the `git` command line
pub struct GitCli {
    git_executable: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            git_executable: executable.into(),
        }
    }

    /// Run git and return trimmed stdout, or an error carrying stderr
    async fn run_checked(&self, args: &[&str]) -> Result<String, GitError> {
        trace!(args = ?args, "Running git");
        let output = Command::new(&self.git_executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| GitError::Spawn { source })?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("{} {}", self.git_executable, args.join(" ")),
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitCli {
    /// Branch name of `HEAD`. An unborn branch (no commits yet) has no
    /// revision to resolve, so its name comes from the symbolic ref.
    async fn current_branch(&self, dir: &str) -> Option<String> {
        let branch = match self
            .run_checked(&["-C", dir, "rev-parse", "--abbrev-ref", "HEAD"])
            .await
        {
            Ok(branch) => branch,
            Err(e) => {
                debug!(dir, "rev-parse HEAD failed, trying symbolic-ref: {}", e);
                self.run_checked(&["-C", dir, "symbolic-ref", "--short", "-q", "HEAD"])
                    .await
                    .ok()?
            }
        };
        Some(branch).filter(|b| !b.is_empty())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl GitOperations for GitCli {
    async fn repository_status(&self, path: &Path) -> Result<LocalStatus, GitError> {
        if !path.exists() {
            return Ok(LocalStatus::missing());
        }
        if !path.join(".git").exists() {
            return Ok(LocalStatus {
                exists: true,
                ..LocalStatus::default()
            });
        }

        let dir = path_arg(path);
        let branch = self.current_branch(&dir).await;
        let porcelain = self.run_checked(&["-C", &dir, "status", "--porcelain"]).await?;

        Ok(LocalStatus {
            exists: true,
            is_git_repo: true,
            current_branch: branch,
            has_changes: !porcelain.is_empty(),
        })
    }

    async fn clone_repository(&self, url: &str, target: &Path) -> Result<(), GitError> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| GitError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        debug!(url, target = %target.display(), "Cloning repository");
        self.run_checked(&["clone", url, &path_arg(target)]).await?;
        Ok(())
    }

    async fn pull_repository(&self, path: &Path) -> Result<(), GitError> {
        debug!(path = %path.display(), "Pulling repository");
        self.run_checked(&["-C", &path_arg(path), "pull"]).await?;
        Ok(())
    }
}
