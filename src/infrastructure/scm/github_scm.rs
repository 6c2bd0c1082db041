use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::scm_interface::{decode_json_response, ScmClient, ScmError};
use crate::domain::entities::Repository;
use crate::domain::value_objects::{validate_full_path, ProviderType};
use crate::infrastructure::http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

const PER_PAGE: u32 = 100;
const PUBLIC_API: &str = "https://api.github.com";

/// GitHub v3 REST client (github.com or Enterprise)
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    token: String,
}

#[derive(Debug, Default, Deserialize)]
struct GitHubPermissions {
    #[serde(default)]
    pull: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubRepository {
    id: u64,
    name: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    clone_url: String,
    #[serde(default)]
    ssh_url: String,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    permissions: Option<GitHubPermissions>,
}

impl GitHubRepository {
    /// Entries the token cannot actually read are listed by `/user/repos`
    /// for some org setups; they are skipped.
    fn is_accessible(&self) -> bool {
        let can_pull = self.permissions.as_ref().map_or(false, |p| p.pull);
        !self.full_name.is_empty() && (!self.private || can_pull)
    }

    fn into_repository(self) -> Repository {
        Repository::new(ProviderType::Github, self.id.to_string(), self.full_name)
            .with_name(self.name)
            .with_clone_urls(self.clone_url, self.ssh_url)
            .with_default_branch(self.default_branch.unwrap_or_default())
            .with_web_url(self.html_url)
    }
}

/// Page numbers parsed from a `Link` response header
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkPagination {
    pub next_page: Option<u32>,
    pub last_page: Option<u32>,
}

/// Parse a GitHub `Link` header such as
/// `<https://api.github.com/user/repos?page=2>; rel="next", <...?page=5>; rel="last"`.
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.trim().split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(rel_value) = segment.strip_prefix("rel=") {
                rel = Some(rel_value.trim_matches('"'));
            }
        }

        if let (Some(url), Some(rel)) = (url, rel) {
            let page = Url::parse(url).ok().and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "page")
                    .and_then(|(_, v)| v.parse::<u32>().ok())
            });
            match (rel, page) {
                ("next", Some(page)) => info.next_page = Some(page),
                ("last", Some(page)) => info.last_page = Some(page),
                _ => {}
            }
        }
    }

    info
}

impl GitHubClient {
    /// Create a client; `base_url` is `github.com` or an Enterprise host.
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
        if token.trim().is_empty() {
            return Err(ScmError::invalid_configuration("GitHub access token is required"));
        }
        Ok(Self {
            transport,
            api_base: api_base_url(base_url)?,
            token: token.to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, ScmError> {
        let request = HttpRequest::get(url)
            .with_header("Authorization", format!("Bearer {}", self.token))
            .with_header("Accept", "application/vnd.github+json")
            .with_header("X-GitHub-Api-Version", "2022-11-28");
        Ok(self.transport.send(request).await?)
    }

    async fn get_all_pages(
        &self,
        route: impl Fn(u32) -> String + Send + Sync,
    ) -> Result<Vec<GitHubRepository>, ScmError> {
        let mut repositories = Vec::new();
        let mut page = 1;

        loop {
            let url = route(page);
            let response = self.get(&url).await?;
            let batch: Vec<GitHubRepository> = decode_json_response(&url, &response)?;
            debug!(page, count = batch.len(), "Fetched GitHub repository page");
            repositories.extend(batch);

            let pagination = response
                .header("link")
                .map(parse_link_header)
                .unwrap_or_default();
            match pagination.next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(repositories)
    }

    async fn list_organization(&self, org: &str) -> Result<Vec<Repository>, ScmError> {
        let encoded: String = url::form_urlencoded::byte_serialize(org.as_bytes()).collect();
        let records = self
            .get_all_pages(|page| {
                format!(
                    "{}/orgs/{}/repos?per_page={}&sort=full_name&direction=asc&page={}",
                    self.api_base, encoded, PER_PAGE, page
                )
            })
            .await?;
        Ok(into_sorted_repositories(records))
    }
}

fn into_sorted_repositories(records: Vec<GitHubRepository>) -> Vec<Repository> {
    let mut repositories: Vec<Repository> = records
        .into_iter()
        .filter(GitHubRepository::is_accessible)
        .filter_map(|record| match validate_full_path(&record.full_name) {
            Ok(()) => Some(record.into_repository()),
            Err(e) => {
                warn!(repository_id = record.id, "Skipping GitHub repository: {}", e);
                None
            }
        })
        .collect();
    repositories.sort_by(|a, b| a.full_path.cmp(&b.full_path));
    repositories
}

#[async_trait]
impl ScmClient for GitHubClient {
    async fn list_all_repositories(&self) -> Result<Vec<Repository>, ScmError> {
        let start = Instant::now();
        let records = self
            .get_all_pages(|page| {
                format!(
                    "{}/user/repos?per_page={}&sort=full_name&direction=asc&page={}",
                    self.api_base, PER_PAGE, page
                )
            })
            .await?;

        let repositories = into_sorted_repositories(records);
        debug!(
            count = repositories.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Listed GitHub repositories"
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

        // Only organizations have a dedicated listing; users and nested
        // paths are filtered from the full listing.
        let from_org = if group_path.contains('/') {
            None
        } else {
            match self.list_organization(group_path).await {
                Ok(repositories) => Some(repositories),
                Err(e) if e.is_not_found() => {
                    info!(owner = group_path, "Not an organization, filtering user repositories");
                    None
                }
                Err(e) => return Err(e),
            }
        };

        let repositories = match from_org {
            Some(repositories) => repositories,
            None => self.list_all_repositories().await?,
        };

        Ok(repositories
            .into_iter()
            .filter(|repo| repo.is_in_group(group_path))
            .collect())
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::Github
    }
}

/// API root for a configured GitHub URL.
///
/// `github.com` maps to the public API; any other host is treated as
/// GitHub Enterprise and gets `/api/v3` unless the path already has it.
pub fn api_base_url(base_url: &str) -> Result<String, ScmError> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Err(ScmError::invalid_configuration("GitHub base URL is required"));
    }

    let with_scheme = if base_url.starts_with("http://") || base_url.starts_with("https://") {
        base_url.to_string()
    } else {
        format!("https://{base_url}")
    };

    let mut parsed = Url::parse(&with_scheme).map_err(|e| {
        ScmError::invalid_configuration(format!("invalid GitHub URL '{base_url}': {e}"))
    })?;
    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => {
            return Err(ScmError::invalid_configuration(format!(
                "GitHub URL '{base_url}' must have a valid host"
            )))
        }
    };

    if host == "github.com" || host == "api.github.com" {
        return Ok(PUBLIC_API.to_string());
    }

    if !parsed.path().contains("/api/v3") {
        parsed.set_path("/api/v3");
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
