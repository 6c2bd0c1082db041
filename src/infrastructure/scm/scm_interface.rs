use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::entities::{Repository, RepositoryTree};
use crate::domain::value_objects::ProviderType;
use crate::infrastructure::http::{HttpError, HttpResponse};

/// Common interface for hosting-provider clients
///
/// Implementations only translate provider API records into the common
/// [`Repository`] model; tree construction is shared.
#[async_trait]
pub trait ScmClient: Send + Sync {
    /// Every repository the authenticated user can see, sorted by full path
    async fn list_all_repositories(&self) -> Result<Vec<Repository>, ScmError>;

    /// Repositories inside `group_path` and its subgroups, sorted by full
    /// path. An empty group path lists everything.
    async fn list_repositories_in_group(
        &self,
        group_path: &str,
    ) -> Result<Vec<Repository>, ScmError>;

    /// Provider this client talks to
    fn provider_type(&self) -> ProviderType;

    /// Fetch all repositories and arrange them with this provider's
    /// nesting policy
    async fn build_repository_tree(&self) -> Result<RepositoryTree, ScmError> {
        let repositories = self.list_all_repositories().await?;
        Ok(RepositoryTree::build(
            repositories,
            self.provider_type().group_nesting(),
        ))
    }
}

/// Errors that can occur while talking to a provider API
#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("invalid provider configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("authentication failed for {url} (HTTP {status}), check the access token")]
    AuthenticationFailed { url: String, status: u16 },

    #[error("group '{group}' not found")]
    GroupNotFound { group: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ScmError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a group not found error
    pub fn group_not_found(group: impl Into<String>) -> Self {
        Self::GroupNotFound {
            group: group.into(),
        }
    }

    /// Whether the provider answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedStatus { status: 404, .. } | Self::GroupNotFound { .. }
        )
    }
}

/// Map non-2xx statuses to errors and decode a JSON body.
pub(crate) fn decode_json_response<T: DeserializeOwned>(
    url: &str,
    response: &HttpResponse,
) -> Result<T, ScmError> {
    match response.status {
        status if (200..300).contains(&status) => {}
        status @ (401 | 403) => {
            return Err(ScmError::AuthenticationFailed {
                url: url.to_string(),
                status,
            })
        }
        status => {
            return Err(ScmError::UnexpectedStatus {
                url: url.to_string(),
                status,
            })
        }
    }

    serde_json::from_slice(&response.body).map_err(|source| ScmError::Decode {
        url: url.to_string(),
        source,
    })
}
