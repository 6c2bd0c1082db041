use super::github_scm::GitHubClient;
use super::gitlab_scm::GitLabClient;
use super::scm_interface::{ScmClient, ScmError};
use crate::domain::value_objects::ProviderType;
use crate::infrastructure::filesystem::config_store::ProviderConfig;
use std::sync::Arc;

/// Factory for provider clients
pub struct ScmFactory;

impl ScmFactory {
    /// Create a client for one configured provider
    pub fn create_client(config: &ProviderConfig) -> Result<Arc<dyn ScmClient>, ScmError> {
        match config.provider_type {
            ProviderType::Gitlab => Ok(Arc::new(GitLabClient::new(
                &config.url,
                &config.token,
                config.insecure,
            )?)),
            ProviderType::Github => Ok(Arc::new(GitHubClient::new(
                &config.url,
                &config.token,
                config.insecure,
            )?)),
        }
    }

    /// Create clients for every configured provider, in configuration order.
    ///
    /// Fails on the first provider whose settings cannot produce a client;
    /// the error names that provider.
    pub fn create_clients(
        configs: &[ProviderConfig],
    ) -> Result<Vec<Arc<dyn ScmClient>>, (String, ScmError)> {
        configs
            .iter()
            .map(|config| Self::create_client(config).map_err(|e| (config.name.clone(), e)))
            .collect()
    }
}
