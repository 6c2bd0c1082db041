//! # gitstuff - repositories across GitLab and GitHub
//!
//! `gitstuff` lists the repositories you can access on one or more hosting
//! providers, shows whether each one is cloned locally, and clones or
//! updates them into a predictable directory layout.
//!
//! ## Quick Start
//!
//! 1. Add a provider (interactive wizard, or flags):
//!
//! ```bash
//! gitstuff config --provider gitlab --url https://gitlab.com --token glpat-...
//! ```
//!
//! 2. List repositories as a group tree with local status:
//!
//! ```bash
//! gitstuff list --tree
//! ```
//!
//! 3. Clone everything in a group over SSH:
//!
//! ```bash
//! gitstuff clone --all team-a
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: the provider-independent repository model and tree builder
//! - [`application`]: multi-provider aggregation and the list/clone workflows
//! - [`infrastructure`]: provider API clients, git, config file and paths
//! - [`presentation`]: CLI and terminal output
//! - [`common`]: shared errors and the verbosity level
//!
//! Repositories are stored under `<base_dir>/<provider>/<full_path>`; clones
//! made before multi-provider support (`<base_dir>/<full_path>`) are still
//! found and reported.
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use gitstuff::application::services::MultiProviderService;
//! use gitstuff::infrastructure::{ConfigStore, ScmFactory};
//!
//! # async fn example() -> gitstuff::Result<()> {
//! let config = ConfigStore::locate(None)?.load()?;
//! let clients = ScmFactory::create_clients(&config.providers)
//!     .map_err(|(name, e)| gitstuff::GitstuffError::config_error(format!("{name}: {e}")))?;
//! let service = MultiProviderService::new(clients);
//!
//! let repo = service.find_repository("team-a/api").await?;
//! println!("{} [{}]", repo.full_path, repo.provider);
//!
//! for provider_tree in service.build_repository_trees().await {
//!     if let Ok(tree) = &provider_tree.tree {
//!         println!("{}: {} repositories", provider_tree.provider, tree.repository_count());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::GitstuffError;
pub use crate::common::result::GitstuffResult as Result;
