use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::common::error::GitstuffError;
use crate::common::result::{GitstuffResult, OptionExt};
use crate::domain::entities::{Repository, RepositoryTree};
use crate::domain::value_objects::ProviderType;
use crate::infrastructure::scm::{ScmClient, ScmError};

/// A provider query that failed while the others went ahead
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: ProviderType,
    pub error: ScmError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error from {} provider: {}", self.provider, self.error)
    }
}

/// Combined output of querying every provider
#[derive(Debug)]
pub struct AggregateResult<T> {
    pub items: Vec<T>,
    pub failures: Vec<ProviderFailure>,
}

impl<T> Default for AggregateResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> AggregateResult<T> {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// One provider's tree, or why it could not be built
#[derive(Debug)]
pub struct ProviderTree {
    pub provider: ProviderType,
    pub tree: Result<RepositoryTree, ScmError>,
}

/// Fans a query out to every configured provider, one after another.
///
/// A failing provider never aborts the others; its error is returned next
/// to the successful results, labeled with the provider type.
pub struct MultiProviderService {
    clients: Vec<Arc<dyn ScmClient>>,
}

impl MultiProviderService {
    pub fn new(clients: Vec<Arc<dyn ScmClient>>) -> Self {
        Self { clients }
    }

    pub fn provider_count(&self) -> usize {
        self.clients.len()
    }

    pub async fn list_all_repositories(&self) -> AggregateResult<Repository> {
        let mut result = AggregateResult::default();
        for client in &self.clients {
            let provider = client.provider_type();
            let start = Instant::now();
            match client.list_all_repositories().await {
                Ok(repositories) => {
                    debug!(
                        %provider,
                        count = repositories.len(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Provider listing complete"
                    );
                    result.items.extend(repositories);
                }
                Err(error) => {
                    warn!(%provider, "Listing repositories failed: {}", error);
                    result.failures.push(ProviderFailure { provider, error });
                }
            }
        }
        result
    }

    pub async fn list_repositories_in_group(&self, group_path: &str) -> AggregateResult<Repository> {
        let mut result = AggregateResult::default();
        for client in &self.clients {
            let provider = client.provider_type();
            match client.list_repositories_in_group(group_path).await {
                Ok(repositories) => result.items.extend(repositories),
                Err(error) => {
                    warn!(%provider, group = group_path, "Listing group failed: {}", error);
                    result.failures.push(ProviderFailure { provider, error });
                }
            }
        }
        result
    }

    /// One entry per provider, in configuration order
    pub async fn build_repository_trees(&self) -> Vec<ProviderTree> {
        let mut trees = Vec::with_capacity(self.clients.len());
        for client in &self.clients {
            let provider = client.provider_type();
            let tree = client.build_repository_tree().await;
            if let Err(error) = &tree {
                warn!(%provider, "Building repository tree failed: {}", error);
            }
            trees.push(ProviderTree { provider, tree });
        }
        trees
    }

    /// Find one repository by full path or by a trailing run of segments.
    ///
    /// An exact full-path match returns immediately (first provider in
    /// order wins). Otherwise suffix matches are collected across all
    /// providers: one match is returned, several are reported as ambiguous.
    /// When every provider failed, the first failure is returned instead of
    /// a not-found error.
    pub async fn find_repository(&self, query: &str) -> GitstuffResult<Repository> {
        let query = query.trim_matches('/');
        if query.is_empty() {
            return Err(GitstuffError::repository_not_found(query));
        }

        let mut candidates: Vec<Repository> = Vec::new();
        let mut failures: Vec<ProviderFailure> = Vec::new();
        for client in &self.clients {
            let provider = client.provider_type();
            let repositories = match client.list_all_repositories().await {
                Ok(repositories) => repositories,
                Err(error) => {
                    warn!(%provider, "Skipping provider during lookup: {}", error);
                    failures.push(ProviderFailure { provider, error });
                    continue;
                }
            };

            if let Some(exact) = repositories.iter().find(|r| r.full_path == query) {
                info!(%provider, full_path = %exact.full_path, "Found repository");
                return Ok(exact.clone());
            }
            candidates.extend(
                repositories
                    .into_iter()
                    .filter(|r| r.matches_path_suffix(query)),
            );
        }

        if candidates.len() > 1 {
            let names = candidates
                .iter()
                .map(|r| format!("[{}] {}", r.provider, r.full_path))
                .collect();
            return Err(GitstuffError::ambiguous_repository(query, names));
        }
        if candidates.is_empty() && failures.len() == self.clients.len() {
            if let Some(failure) = failures.into_iter().next() {
                return Err(failure.into());
            }
        }
        candidates.pop().ok_or_not_found(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct StaticClient {
        provider: ProviderType,
        paths: Option<Vec<&'static str>>,
    }

    #[async_trait]
    impl ScmClient for StaticClient {
        async fn list_all_repositories(&self) -> Result<Vec<Repository>, ScmError> {
            match &self.paths {
                Some(paths) => Ok(paths
                    .iter()
                    .map(|p| Repository::new(self.provider, *p, *p))
                    .collect()),
                None => Err(ScmError::invalid_configuration("boom")),
            }
        }

        async fn list_repositories_in_group(
            &self,
            group_path: &str,
        ) -> Result<Vec<Repository>, ScmError> {
            Ok(self
                .list_all_repositories()
                .await?
                .into_iter()
                .filter(|r| r.is_in_group(group_path))
                .collect())
        }

        fn provider_type(&self) -> ProviderType {
            self.provider
        }
    }

    fn service(clients: Vec<StaticClient>) -> MultiProviderService {
        MultiProviderService::new(
            clients
                .into_iter()
                .map(|c| Arc::new(c) as Arc<dyn ScmClient>)
                .collect(),
        )
    }

    fn ok(provider: ProviderType, paths: &[&'static str]) -> StaticClient {
        StaticClient {
            provider,
            paths: Some(paths.to_vec()),
        }
    }

    fn failing(provider: ProviderType) -> StaticClient {
        StaticClient {
            provider,
            paths: None,
        }
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_labeled() {
        let service = service(vec![
            ok(ProviderType::Gitlab, &["a/1", "a/2", "b/3"]),
            failing(ProviderType::Github),
        ]);

        let result = service.list_all_repositories().await;
        assert_eq!(result.items.len(), 3);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].provider, ProviderType::Github);
        assert!(result.failures[0].to_string().starts_with("error from github provider"));
    }

    #[tokio::test]
    async fn test_total_failure_is_empty_not_error() {
        let service = service(vec![failing(ProviderType::Gitlab), failing(ProviderType::Github)]);
        let result = service.list_repositories_in_group("a").await;
        assert!(result.items.is_empty());
        assert_eq!(result.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_trees_follow_client_order() {
        let service = service(vec![failing(ProviderType::Gitlab), ok(ProviderType::Github, &["o/r"])]);
        let trees = service.build_repository_trees().await;
        assert_eq!(trees.len(), 2);
        assert!(trees[0].tree.is_err());
        assert_eq!(trees[1].tree.as_ref().unwrap().repository_count(), 1);
    }

    #[tokio::test]
    async fn test_exact_match_wins_over_suffix() {
        let service = service(vec![
            ok(ProviderType::Gitlab, &["team/api"]),
            ok(ProviderType::Github, &["api"]),
        ]);
        let found = service.find_repository("api").await.unwrap();
        assert_eq!(found.provider, ProviderType::Github);
        assert_eq!(found.full_path, "api");
    }

    #[tokio::test]
    async fn test_exact_match_first_provider_wins() {
        let service = service(vec![
            ok(ProviderType::Gitlab, &["team/api"]),
            ok(ProviderType::Github, &["team/api"]),
        ]);
        let found = service.find_repository("team/api").await.unwrap();
        assert_eq!(found.provider, ProviderType::Gitlab);
    }

    #[tokio::test]
    async fn test_single_suffix_match() {
        let service = service(vec![
            failing(ProviderType::Gitlab),
            ok(ProviderType::Github, &["octo/tools", "octo/web"]),
        ]);
        let found = service.find_repository("web").await.unwrap();
        assert_eq!(found.full_path, "octo/web");
    }

    #[tokio::test]
    async fn test_ambiguous_suffix_lists_candidates() {
        let service = service(vec![
            ok(ProviderType::Gitlab, &["team-a/api"]),
            ok(ProviderType::Github, &["team-b/api"]),
        ]);
        match service.find_repository("api").await {
            Err(GitstuffError::AmbiguousRepository { candidates, .. }) => assert_eq!(
                candidates,
                vec!["[gitlab] team-a/api".to_string(), "[github] team-b/api".to_string()]
            ),
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_found() {
        let service = service(vec![ok(ProviderType::Gitlab, &["team-a/api"])]);
        let err = service.find_repository("team-a/nonexistent").await.unwrap_err();
        assert!(matches!(err, GitstuffError::RepositoryNotFound { .. }));
        assert!(service.find_repository("pi").await.is_err());
    }

    #[tokio::test]
    async fn test_lookup_reports_provider_error_when_all_fail() {
        let service = service(vec![failing(ProviderType::Github), failing(ProviderType::Gitlab)]);
        match service.find_repository("team-a/api").await {
            Err(GitstuffError::ProviderError { provider, .. }) => {
                assert_eq!(provider, ProviderType::Github)
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lookup_partial_failure_is_not_found() {
        let service = service(vec![failing(ProviderType::Github), ok(ProviderType::Gitlab, &["x/y"])]);
        let err = service.find_repository("team-a/api").await.unwrap_err();
        assert!(matches!(err, GitstuffError::RepositoryNotFound { .. }));
    }
}
