use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::application::services::{MultiProviderService, ProviderFailure};
use crate::domain::entities::{GroupNode, Repository, RepositoryTree};
use crate::domain::value_objects::ProviderType;
use crate::infrastructure::filesystem::{PathLayout, PathResolver};
use crate::infrastructure::git::{GitOperations, LocalStatus};
use crate::infrastructure::scm::ScmError;

/// Local status, or the message of the git error that prevented reading it
pub type StatusOutcome = Result<LocalStatus, String>;

/// Settings for listing repositories
#[derive(Debug, Clone)]
pub struct ListRepositoriesConfig {
    /// Restrict to this group path
    pub group: Option<String>,

    /// Inspect local clones
    pub show_status: bool,
}

impl Default for ListRepositoriesConfig {
    fn default() -> Self {
        Self {
            group: None,
            show_status: true,
        }
    }
}

impl ListRepositoriesConfig {
    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group.filter(|g| !g.trim_matches('/').is_empty());
        self
    }

    pub fn with_status(mut self, show_status: bool) -> Self {
        self.show_status = show_status;
        self
    }
}

/// A repository with where it lives locally
#[derive(Debug, Clone)]
pub struct ListedRepository {
    pub repository: Repository,
    pub local_path: PathBuf,
    pub layout: PathLayout,
    /// `None` when status display is off
    pub status: Option<StatusOutcome>,
}

/// Flat listing across providers
#[derive(Debug)]
pub struct RepositoryListing {
    pub repositories: Vec<ListedRepository>,
    pub failures: Vec<ProviderFailure>,
}

/// What part of a provider's tree to show
#[derive(Debug)]
pub enum TreeSelection {
    Whole(RepositoryTree),
    Group(GroupNode),
    /// The requested group does not exist for this provider
    GroupNotFound(String),
}

#[derive(Debug)]
pub struct ProviderTreeListing {
    pub provider: ProviderType,
    pub selection: Result<TreeSelection, ScmError>,
}

/// Per-provider trees plus the local status of every repository in them
#[derive(Debug)]
pub struct RepositoryTreeListing {
    pub providers: Vec<ProviderTreeListing>,
    pub group_filter: Option<String>,
    statuses: HashMap<(ProviderType, String), StatusOutcome>,
}

impl RepositoryTreeListing {
    /// Status recorded for `repository`, if statuses were collected
    pub fn status_of(&self, repository: &Repository) -> Option<&StatusOutcome> {
        self.statuses
            .get(&(repository.provider, repository.full_path.clone()))
    }
}

/// Lists repositories from every provider, flat or as trees
pub struct ListRepositoriesUseCase {
    service: Arc<MultiProviderService>,
    git: Arc<dyn GitOperations>,
    resolver: PathResolver,
    config: ListRepositoriesConfig,
}

impl ListRepositoriesUseCase {
    pub fn new(
        service: Arc<MultiProviderService>,
        git: Arc<dyn GitOperations>,
        resolver: PathResolver,
        config: ListRepositoriesConfig,
    ) -> Self {
        Self {
            service,
            git,
            resolver,
            config,
        }
    }

    async fn status_for(&self, repository: &Repository, path: &std::path::Path) -> StatusOutcome {
        match self.git.repository_status(path).await {
            Ok(status) => Ok(status),
            Err(e) => {
                debug!(full_path = %repository.full_path, "Status check failed: {}", e);
                Err(e.to_string())
            }
        }
    }

    /// Flat listing, optionally restricted to the configured group
    pub async fn execute(&self) -> RepositoryListing {
        let start = Instant::now();
        let aggregate = match &self.config.group {
            Some(group) => self.service.list_repositories_in_group(group).await,
            None => self.service.list_all_repositories().await,
        };
        debug!(
            providers = self.service.provider_count(),
            count = aggregate.items.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Repository discovery completed"
        );

        let mut repositories = Vec::with_capacity(aggregate.items.len());
        for repository in aggregate.items {
            let resolved = self.resolver.resolve(&repository);
            let status = if self.config.show_status {
                Some(self.status_for(&repository, &resolved.path).await)
            } else {
                None
            };
            repositories.push(ListedRepository {
                repository,
                local_path: resolved.path,
                layout: resolved.layout,
                status,
            });
        }

        RepositoryListing {
            repositories,
            failures: aggregate.failures,
        }
    }

    /// Tree listing per provider; the group filter selects a subtree
    pub async fn execute_tree(&self) -> RepositoryTreeListing {
        let mut providers = Vec::new();
        let mut statuses = HashMap::new();

        for provider_tree in self.service.build_repository_trees().await {
            let selection = provider_tree.tree.map(|tree| match &self.config.group {
                None => TreeSelection::Whole(tree),
                Some(group) => match tree.find_group(group.trim_end_matches('/')) {
                    Some(node) => TreeSelection::Group(node.clone()),
                    None => TreeSelection::GroupNotFound(group.clone()),
                },
            });

            if self.config.show_status {
                let repositories: Vec<Repository> = match &selection {
                    Ok(TreeSelection::Whole(tree)) => {
                        tree.all_repositories().into_iter().cloned().collect()
                    }
                    Ok(TreeSelection::Group(node)) => {
                        node.all_repositories().into_iter().cloned().collect()
                    }
                    _ => Vec::new(),
                };
                for repository in repositories {
                    let path = self.resolver.resolve_repository_path(&repository);
                    let status = self.status_for(&repository, &path).await;
                    statuses.insert((repository.provider, repository.full_path), status);
                }
            }

            providers.push(ProviderTreeListing {
                provider: provider_tree.provider,
                selection,
            });
        }

        RepositoryTreeListing {
            providers,
            group_filter: self.config.group.clone(),
            statuses,
        }
    }
}
