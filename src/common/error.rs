use thiserror::Error;

use crate::application::services::ProviderFailure;
use crate::domain::value_objects::ProviderType;
use crate::infrastructure::filesystem::config_store::ConfigStoreError;
use crate::infrastructure::git::GitError;
use crate::infrastructure::scm::scm_interface::ScmError;

const CONFIG_HINT: &str = "(run 'gitstuff config' to set up providers)";

#[derive(Error, Debug)]
pub enum GitstuffError {
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{provider} provider error: {source}")]
    ProviderError {
        provider: ProviderType,
        #[source]
        source: ScmError,
    },

    #[error("repository '{query}' not found in any configured provider")]
    RepositoryNotFound { query: String },

    #[error("repository '{query}' is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousRepository {
        query: String,
        candidates: Vec<String>,
    },

    #[error("no repositories found in group '{group}'")]
    EmptyGroup { group: String },

    #[error("Git operation failed: {message}")]
    GitError {
        message: String,
        #[source]
        source: Option<GitError>,
    },
}

impl GitstuffError {
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn provider_error(provider: ProviderType, source: ScmError) -> Self {
        Self::ProviderError { provider, source }
    }

    pub fn repository_not_found(query: impl Into<String>) -> Self {
        Self::RepositoryNotFound {
            query: query.into(),
        }
    }

    pub fn ambiguous_repository(query: impl Into<String>, candidates: Vec<String>) -> Self {
        Self::AmbiguousRepository {
            query: query.into(),
            candidates,
        }
    }

    pub fn empty_group(group: impl Into<String>) -> Self {
        Self::EmptyGroup {
            group: group.into(),
        }
    }

    pub fn git_error(message: impl Into<String>) -> Self {
        Self::GitError {
            message: message.into(),
            source: None,
        }
    }

    pub fn git_error_with_source(message: impl Into<String>, source: GitError) -> Self {
        Self::GitError {
            message: message.into(),
            source: Some(source),
        }
    }
}

impl From<ConfigStoreError> for GitstuffError {
    fn from(error: ConfigStoreError) -> Self {
        let message = match &error {
            ConfigStoreError::ConfigFileNotFound(_)
            | ConfigStoreError::NoProviders
            | ConfigStoreError::YamlParsingFailed { .. } => format!("{error} {CONFIG_HINT}"),
            _ => error.to_string(),
        };
        Self::config_error_with_source(message, error)
    }
}

impl From<GitError> for GitstuffError {
    fn from(error: GitError) -> Self {
        Self::git_error_with_source(error.to_string(), error)
    }
}

impl From<ProviderFailure> for GitstuffError {
    fn from(failure: ProviderFailure) -> Self {
        Self::provider_error(failure.provider, failure.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_not_found_message() {
        let error = GitstuffError::repository_not_found("team-a/nonexistent");
        assert_eq!(
            error.to_string(),
            "repository 'team-a/nonexistent' not found in any configured provider"
        );
    }

    #[test]
    fn test_ambiguous_repository_lists_candidates() {
        let error = GitstuffError::ambiguous_repository(
            "api",
            vec!["team-a/api".to_string(), "team-b/api".to_string()],
        );
        assert_eq!(
            error.to_string(),
            "repository 'api' is ambiguous, candidates: team-a/api, team-b/api"
        );
    }

    #[test]
    fn test_empty_group_message() {
        let error = GitstuffError::empty_group("team-z");
        assert_eq!(error.to_string(), "no repositories found in group 'team-z'");
    }

    #[test]
    fn test_config_store_error_suggests_config_command() {
        let error: GitstuffError = ConfigStoreError::NoProviders.into();
        assert!(matches!(error, GitstuffError::ConfigError { .. }));
        assert!(error.to_string().contains("gitstuff config"));

        let missing: GitstuffError =
            ConfigStoreError::ConfigFileNotFound(std::path::PathBuf::from("/tmp/x.yaml")).into();
        assert!(missing.to_string().contains("gitstuff config"));
    }

    #[test]
    fn test_write_failure_has_no_setup_hint() {
        let error: GitstuffError = ConfigStoreError::WriteFailed {
            path: std::path::PathBuf::from("/root/.gitstuff.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        let message = error.to_string();
        assert!(message.contains("failed to write /root/.gitstuff.yaml"));
        assert!(!message.contains("gitstuff config"));
    }

    #[test]
    fn test_provider_failure_keeps_provider_label() {
        let error: GitstuffError = ProviderFailure {
            provider: ProviderType::Github,
            error: ScmError::invalid_configuration("GitHub token is required"),
        }
        .into();
        assert!(matches!(
            error,
            GitstuffError::ProviderError { provider: ProviderType::Github, .. }
        ));
        assert_eq!(
            error.to_string(),
            "github provider error: invalid provider configuration: GitHub token is required"
        );
    }

    #[test]
    fn test_git_error_conversion() {
        let error: GitstuffError = GitError::CommandFailed {
            command: "git pull".to_string(),
            exit_code: 1,
            stderr: "no remote".to_string(),
        }
        .into();
        assert!(matches!(error, GitstuffError::GitError { source: Some(_), .. }));
    }
}
