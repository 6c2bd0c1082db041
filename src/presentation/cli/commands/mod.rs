pub mod clone;
pub mod config;
pub mod list;
pub mod version;

pub use clone::*;
pub use config::*;
pub use list::*;
pub use version::*;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::MultiProviderService;
use crate::common::error::GitstuffError;
use crate::infrastructure::filesystem::{AppConfig, ConfigStore, PathResolver};
use crate::infrastructure::scm::ScmFactory;
use crate::presentation::ui::DisplayHelper;

/// Settings shared by every command
pub struct CommandContext {
    /// `--config` / `GITSTUFF_CONFIG`
    pub config_path: Option<PathBuf>,
    pub display: DisplayHelper,
}

impl CommandContext {
    pub fn config_store(&self) -> Result<ConfigStore, GitstuffError> {
        Ok(ConfigStore::locate(self.config_path.clone())?)
    }
}

/// Configured providers ready to be queried
pub(crate) struct Connected {
    pub config: AppConfig,
    pub service: Arc<MultiProviderService>,
    pub resolver: PathResolver,
}

/// Load the configuration and build one client per provider
pub(crate) fn connect(context: &CommandContext) -> Result<Connected, GitstuffError> {
    let store = context.config_store()?;
    let config = store.load()?;
    let providers = config.require_providers()?;
    debug!(
        path = %store.path().display(),
        providers = providers.len(),
        "Loaded configuration"
    );

    let clients = ScmFactory::create_clients(providers).map_err(|(name, e)| {
        GitstuffError::config_error_with_source(
            format!("failed to create client for provider {name}: {e}"),
            e,
        )
    })?;

    let resolver = PathResolver::new(&config.local.base_dir);
    Ok(Connected {
        service: Arc::new(MultiProviderService::new(clients)),
        resolver,
        config,
    })
}
