use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::scm_interface::{decode_json_response, ScmClient, ScmError};
use crate::domain::entities::Repository;
use crate::domain::value_objects::{validate_full_path, ProviderType};
use crate::infrastructure::http::{HttpRequest, HttpTransport, ReqwestTransport};

const PER_PAGE: u32 = 100;

/// GitLab v4 REST client
pub struct GitLabClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    token: String,
}

/// Project record as returned by `/projects`
#[derive(Debug, Deserialize)]
struct GitLabProject {
    id: u64,
    name: String,
    path_with_namespace: String,
    #[serde(default)]
    http_url_to_repo: String,
    #[serde(default)]
    ssh_url_to_repo: String,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    web_url: String,
}

#[derive(Debug, Deserialize)]
struct GitLabGroup {
    id: u64,
}

impl GitLabProject {
    fn into_repository(self) -> Repository {
        Repository::new(ProviderType::Gitlab, self.id.to_string(), self.path_with_namespace)
            .with_name(self.name)
            .with_clone_urls(self.http_url_to_repo, self.ssh_url_to_repo)
            .with_default_branch(self.default_branch.unwrap_or_default())
            .with_web_url(self.web_url)
    }
}

impl GitLabClient {
    /// Create a client for the instance at `base_url` (scheme optional).
    pub fn new(base_url: &str, token: &str, insecure: bool) -> Result<Self, ScmError> {
        let transport = ReqwestTransport::new(insecure)?;
        Self::with_transport(base_url, token, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(
        base_url: &str,
        token: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ScmError> {
        let instance = normalize_url(base_url)?;
        Ok(Self {
            transport,
            api_base: format!("{instance}/api/v4"),
            token: token.to_string(),
        })
    }

    /// Base URL of the v4 API, e.g. `https://gitlab.com/api/v4`
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Fetch every page of a paginated listing. `route` receives the page
    /// number and returns the full request URL.
    async fn get_all_pages(
        &self,
        route: impl Fn(u32) -> String + Send + Sync,
    ) -> Result<Vec<GitLabProject>, ScmError> {
        let mut projects = Vec::new();
        let mut page = 1;

        loop {
            let url = route(page);
            let response = self.get(&url).await?;
            let batch: Vec<GitLabProject> = decode_json_response(&url, &response)?;
            debug!(page, count = batch.len(), "Fetched GitLab project page");
            projects.extend(batch);

            // X-Next-Page is empty on the last page
            match response
                .header("x-next-page")
                .and_then(|v| v.trim().parse::<u32>().ok())
            {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(projects)
    }

    async fn get(
        &self,
        url: &str,
    ) -> Result<crate::infrastructure::http::HttpResponse, ScmError> {
        let request = HttpRequest::get(url)
            .with_header("Authorization", format!("Bearer {}", self.token))
            .with_header("Accept", "application/json");
        Ok(self.transport.send(request).await?)
    }

    async fn group_id(&self, group_path: &str) -> Result<u64, ScmError> {
        let encoded: String = url::form_urlencoded::byte_serialize(group_path.as_bytes()).collect();
        let url = format!("{}/groups/{}", self.api_base, encoded);
        let response = self.get(&url).await?;
        if response.status == 404 {
            return Err(ScmError::group_not_found(group_path));
        }
        let group: GitLabGroup = decode_json_response(&url, &response)?;
        Ok(group.id)
    }
}

/// Drop records with malformed paths, convert, sort by full path.
fn into_sorted_repositories(projects: Vec<GitLabProject>) -> Vec<Repository> {
    let mut repositories: Vec<Repository> = projects
        .into_iter()
        .filter_map(|project| match validate_full_path(&project.path_with_namespace) {
            Ok(()) => Some(project.into_repository()),
            Err(e) => {
                warn!(project_id = project.id, "Skipping GitLab project: {}", e);
                None
            }
        })
        .collect();
    repositories.sort_by(|a, b| a.full_path.cmp(&b.full_path));
    repositories
}

#[async_trait]
impl ScmClient for GitLabClient {
    async fn list_all_repositories(&self) -> Result<Vec<Repository>, ScmError> {
        let start = Instant::now();
        let projects = self
            .get_all_pages(|page| {
                format!(
                    "{}/projects?membership=true&simple=false&order_by=path&sort=asc&per_page={}&page={}",
                    self.api_base, PER_PAGE, page
                )
            })
            .await?;

        let repositories = into_sorted_repositories(projects);
        debug!(
            count = repositories.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Listed GitLab repositories"
        );
        Ok(repositories)
    }

    async fn list_repositories_in_group(
        &self,
        group_path: &str,
    ) -> Result<Vec<Repository>, ScmError> {
        let group_path = group_path.trim_matches('/');
        if group_path.is_empty() {
            return self.list_all_repositories().await;
        }

        let start = Instant::now();
        let group_id = self.group_id(group_path).await?;
        let projects = self
            .get_all_pages(|page| {
                format!(
                    "{}/groups/{}/projects?include_subgroups=true&order_by=path&sort=asc&per_page={}&page={}",
                    self.api_base, group_id, PER_PAGE, page
                )
            })
            .await?;

        let repositories: Vec<Repository> = into_sorted_repositories(projects)
            .into_iter()
            .filter(|repo| repo.is_in_group(group_path))
            .collect();
        debug!(
            group = group_path,
            count = repositories.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Listed GitLab group repositories"
        );
        Ok(repositories)
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Gitlab
    }
}

/// Add `https://` when no scheme is given and require a host. The result
/// has no trailing slash.
pub fn normalize_url(base_url: &str) -> Result<String, ScmError> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Err(ScmError::invalid_configuration("GitLab URL cannot be empty"));
    }

    let with_scheme = if base_url.starts_with("http://") || base_url.starts_with("https://") {
        base_url.to_string()
    } else {
        format!("https://{base_url}")
    };

    let parsed = Url::parse(&with_scheme).map_err(|e| {
        ScmError::invalid_configuration(format!("invalid GitLab URL '{base_url}': {e}"))
    })?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ScmError::invalid_configuration(format!(
            "GitLab URL '{base_url}' must have a valid host"
        )));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
