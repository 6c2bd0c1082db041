pub mod config_store;
pub mod path_resolver;

pub use config_store::{AddProviderRequest, AppConfig, ConfigStore, ConfigStoreError, ProviderConfig};
pub use path_resolver::{PathLayout, PathResolver, ResolvedPath};
