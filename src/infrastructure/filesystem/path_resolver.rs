use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::domain::entities::Repository;

/// Which on-disk layout a resolved path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathLayout {
    /// `<base>/<provider>/<full_path>`
    Provider,
    /// `<base>/<full_path>`, from before multi-provider support
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub layout: PathLayout,
}

/// Maps repositories to local directories under a base directory
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_dir: PathBuf,
}

fn join_segments(base: &Path, full_path: &str) -> PathBuf {
    full_path
        .split('/')
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}

impl PathResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `<base>/<provider>/<full_path>`
    pub fn provider_path(&self, repository: &Repository) -> PathBuf {
        join_segments(
            &self.base_dir.join(repository.provider.directory_name()),
            &repository.full_path,
        )
    }

    /// `<base>/<full_path>`
    pub fn legacy_path(&self, repository: &Repository) -> PathBuf {
        join_segments(&self.base_dir, &repository.full_path)
    }

    /// Locate an existing clone: provider layout first, then legacy layout.
    /// When neither exists the provider path is returned.
    pub fn resolve(&self, repository: &Repository) -> ResolvedPath {
        let provider_path = self.provider_path(repository);
        trace!(path = %provider_path.display(), "Checking provider layout");
        if provider_path.exists() {
            debug!(path = %provider_path.display(), "Found repository in provider layout");
            return ResolvedPath {
                path: provider_path,
                layout: PathLayout::Provider,
            };
        }

        let legacy_path = self.legacy_path(repository);
        trace!(path = %legacy_path.display(), "Checking legacy layout");
        if legacy_path.exists() {
            debug!(path = %legacy_path.display(), "Found repository in legacy layout");
            return ResolvedPath {
                path: legacy_path,
                layout: PathLayout::Legacy,
            };
        }

        debug!(
            path = %provider_path.display(),
            "Repository not found locally, using provider layout"
        );
        ResolvedPath {
            path: provider_path,
            layout: PathLayout::Provider,
        }
    }

    /// Path only, see [`PathResolver::resolve`]
    pub fn resolve_repository_path(&self, repository: &Repository) -> PathBuf {
        self.resolve(repository).path
    }

    /// Where a new clone goes; always the provider layout
    pub fn clone_path(&self, repository: &Repository) -> PathBuf {
        let path = self.provider_path(repository);
        debug!(full_path = %repository.full_path, path = %path.display(), "Clone path");
        path
    }
}
