use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::application::services::{MultiProviderService, ProviderFailure};
use crate::common::error::GitstuffError;
use crate::common::result::GitstuffResult;
use crate::domain::entities::Repository;
use crate::infrastructure::filesystem::PathResolver;
use crate::infrastructure::git::GitOperations;

/// Which repositories to clone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneTarget {
    /// Everything from every provider
    All,
    /// Everything inside a group path
    Group(String),
    /// One repository by full path or path suffix
    Single(String),
}

/// Settings for the clone operation
#[derive(Debug, Clone)]
pub struct CloneRepositoriesConfig {
    pub target: CloneTarget,

    /// Clone over SSH instead of HTTPS
    pub use_ssh: bool,

    /// Pull repositories that are already cloned
    pub update: bool,
}

impl Default for CloneRepositoriesConfig {
    fn default() -> Self {
        Self {
            target: CloneTarget::All,
            use_ssh: true,
            update: false,
        }
    }
}

impl CloneRepositoriesConfig {
    pub fn new(target: CloneTarget) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn with_ssh(mut self, use_ssh: bool) -> Self {
        self.use_ssh = use_ssh;
        self
    }

    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }
}

/// What happened to one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOutcome {
    Cloned { path: PathBuf },
    Updated { path: PathBuf },
    /// Present locally and `update` was off
    AlreadyCloned { path: PathBuf },
    Failed { path: PathBuf, reason: String },
}

impl RepositoryOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RepositoryOutcome::Failed { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            RepositoryOutcome::Cloned { path }
            | RepositoryOutcome::Updated { path }
            | RepositoryOutcome::AlreadyCloned { path }
            | RepositoryOutcome::Failed { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedRepository {
    pub repository: Repository,
    pub outcome: RepositoryOutcome,
}

/// Result of a clone run
#[derive(Debug, Default)]
pub struct CloneSummary {
    pub processed: Vec<ProcessedRepository>,
    pub failures: Vec<ProviderFailure>,
}

impl CloneSummary {
    pub fn successful(&self) -> usize {
        self.processed.iter().filter(|p| p.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.processed.len() - self.successful()
    }
}

/// Progress notifications while a clone run is in flight
#[derive(Debug)]
pub enum CloneEvent<'a> {
    /// A provider could not be queried
    ProviderFailed(&'a ProviderFailure),
    /// Discovery finished
    Discovered {
        total: usize,
        group: Option<&'a str>,
    },
    /// A single-repository lookup resolved
    Resolved { repository: &'a Repository },
    /// Work on one repository starts (1-based index)
    Processing {
        index: usize,
        total: usize,
        repository: &'a Repository,
    },
    Cloning { url: &'a str },
    Pulling,
    Finished { outcome: &'a RepositoryOutcome },
}

pub type ProgressCallback = Box<dyn Fn(&CloneEvent<'_>) + Send + Sync>;

/// Clones or updates repositories from every configured provider
pub struct CloneRepositoriesUseCase {
    service: Arc<MultiProviderService>,
    git: Arc<dyn GitOperations>,
    resolver: PathResolver,
    config: CloneRepositoriesConfig,
    progress: Option<ProgressCallback>,
}

impl CloneRepositoriesUseCase {
    pub fn new(
        service: Arc<MultiProviderService>,
        git: Arc<dyn GitOperations>,
        resolver: PathResolver,
        config: CloneRepositoriesConfig,
    ) -> Self {
        Self {
            service,
            git,
            resolver,
            config,
            progress: None,
        }
    }

    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&CloneEvent<'_>) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    fn emit(&self, event: CloneEvent<'_>) {
        if let Some(progress) = &self.progress {
            progress(&event);
        }
    }

    /// Run the clone.
    ///
    /// Batch targets report per-repository failures in the summary. A
    /// single-repository target fails outright instead.
    pub async fn execute(&self) -> GitstuffResult<CloneSummary> {
        let start = Instant::now();
        let result = match &self.config.target {
            CloneTarget::All => {
                info!("Cloning all repositories from all providers");
                let aggregate = self.service.list_all_repositories().await;
                self.process_batch(aggregate.items, aggregate.failures, None)
                    .await
            }
            CloneTarget::Group(group) => {
                info!(group = %group, "Cloning all repositories in group");
                let aggregate = self.service.list_repositories_in_group(group).await;
                if aggregate.items.is_empty() {
                    for failure in &aggregate.failures {
                        self.emit(CloneEvent::ProviderFailed(failure));
                    }
                    return Err(GitstuffError::empty_group(group.clone()));
                }
                self.process_batch(aggregate.items, aggregate.failures, Some(group.as_str()))
                    .await
            }
            CloneTarget::Single(query) => {
                info!(query = %query, "Cloning single repository");
                self.process_single(query).await
            }
        };
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Clone operation completed"
        );
        result
    }

    async fn process_batch(
        &self,
        repositories: Vec<Repository>,
        failures: Vec<ProviderFailure>,
        group: Option<&str>,
    ) -> GitstuffResult<CloneSummary> {
        for failure in &failures {
            self.emit(CloneEvent::ProviderFailed(failure));
        }

        let total = repositories.len();
        self.emit(CloneEvent::Discovered { total, group });

        let mut processed = Vec::with_capacity(total);
        for (index, repository) in repositories.into_iter().enumerate() {
            self.emit(CloneEvent::Processing {
                index: index + 1,
                total,
                repository: &repository,
            });
            let outcome = self.process_repository(&repository).await;
            self.emit(CloneEvent::Finished { outcome: &outcome });
            processed.push(ProcessedRepository {
                repository,
                outcome,
            });
        }

        Ok(CloneSummary {
            processed,
            failures,
        })
    }

    async fn process_single(&self, query: &str) -> GitstuffResult<CloneSummary> {
        let repository = self.service.find_repository(query).await?;
        self.emit(CloneEvent::Resolved {
            repository: &repository,
        });

        let outcome = self.process_repository(&repository).await;
        if let RepositoryOutcome::Failed { reason, .. } = &outcome {
            return Err(GitstuffError::git_error(format!(
                "{}: {}",
                repository.full_path, reason
            )));
        }
        self.emit(CloneEvent::Finished { outcome: &outcome });

        Ok(CloneSummary {
            processed: vec![ProcessedRepository {
                repository,
                outcome,
            }],
            failures: Vec::new(),
        })
    }

    async fn process_repository(&self, repository: &Repository) -> RepositoryOutcome {
        let start = Instant::now();
        let resolved = self.resolver.resolve(repository);
        debug!(path = %resolved.path.display(), "Checking repository status");

        let status = match self.git.repository_status(&resolved.path).await {
            Ok(status) => status,
            Err(e) => {
                return RepositoryOutcome::Failed {
                    path: resolved.path,
                    reason: format!("error checking status: {e}"),
                }
            }
        };

        let outcome = if status.is_cloned() {
            if self.config.update {
                self.emit(CloneEvent::Pulling);
                match self.git.pull_repository(&resolved.path).await {
                    Ok(()) => RepositoryOutcome::Updated {
                        path: resolved.path,
                    },
                    Err(e) => RepositoryOutcome::Failed {
                        path: resolved.path,
                        reason: format!("failed to pull: {e}"),
                    },
                }
            } else {
                RepositoryOutcome::AlreadyCloned {
                    path: resolved.path,
                }
            }
        } else if status.exists {
            RepositoryOutcome::Failed {
                path: resolved.path,
                reason: "directory exists but is not a git repository".to_string(),
            }
        } else {
            self.clone_new(repository).await
        };

        debug!(
            full_path = %repository.full_path,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Processed repository"
        );
        outcome
    }

    async fn clone_new(&self, repository: &Repository) -> RepositoryOutcome {
        let path = self.resolver.clone_path(repository);
        let url = repository.clone_url_for(self.config.use_ssh);
        if url.is_empty() {
            return RepositoryOutcome::Failed {
                path,
                reason: "provider reported no clone URL".to_string(),
            };
        }

        debug!(
            protocol = if self.config.use_ssh { "ssh" } else { "https" },
            url,
            "Cloning repository"
        );
        self.emit(CloneEvent::Cloning { url });
        match self.git.clone_repository(url, &path).await {
            Ok(()) => RepositoryOutcome::Cloned { path },
            Err(e) => RepositoryOutcome::Failed {
                path,
                reason: format!("failed to clone: {e}"),
            },
        }
    }
}
