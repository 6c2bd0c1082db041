use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ProviderType;

/// A repository as reported by a hosting provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Provider-scoped identifier
    pub id: String,

    /// Last segment of the full path
    pub name: String,

    /// Slash-delimited path, e.g. `team-a/backend/api`
    pub full_path: String,

    /// HTTPS clone URL
    pub clone_url: String,

    /// SSH clone URL
    pub ssh_clone_url: String,

    /// Default branch, empty when the provider reports none
    pub default_branch: String,

    /// Browser URL
    pub web_url: String,

    /// Provider that reported this repository
    pub provider: ProviderType,
}

impl Repository {
    /// Create a repository; `name` is taken from the last path segment.
    pub fn new(provider: ProviderType, id: impl Into<String>, full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let name = full_path
            .rsplit('/')
            .next()
            .unwrap_or(full_path.as_str())
            .to_string();
        Self {
            id: id.into(),
            name,
            full_path,
            clone_url: String::new(),
            ssh_clone_url: String::new(),
            default_branch: String::new(),
            web_url: String::new(),
            provider,
        }
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the HTTPS and SSH clone URLs
    pub fn with_clone_urls(mut self, https: impl Into<String>, ssh: impl Into<String>) -> Self {
        self.clone_url = https.into();
        self.ssh_clone_url = ssh.into();
        self
    }

    /// Set the default branch
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    /// Set the browser URL
    pub fn with_web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = url.into();
        self
    }

    /// Clone URL for the requested transport
    pub fn clone_url_for(&self, use_ssh: bool) -> &str {
        if use_ssh {
            &self.ssh_clone_url
        } else {
            &self.clone_url
        }
    }

    /// Group segments of the full path (everything but the last segment)
    pub fn group_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.full_path.split('/').collect();
        segments.pop();
        segments
    }

    /// Whether this repository lives in `group_path` or one of its subgroups.
    ///
    /// Matching is on whole segments: `team-ab/x` is not in `team-a`.
    /// A trailing `/` on the group path is ignored.
    pub fn is_in_group(&self, group_path: &str) -> bool {
        let group_path = group_path.trim_end_matches('/');
        if group_path.is_empty() {
            return false;
        }
        self.full_path == group_path
            || self
                .full_path
                .strip_prefix(group_path)
                .map_or(false, |rest| rest.starts_with('/'))
    }

    /// Whether `query` names this repository by a trailing run of whole
    /// segments (`api` and `backend/api` both match `team-a/backend/api`).
    pub fn matches_path_suffix(&self, query: &str) -> bool {
        !query.is_empty()
            && (self.full_path == query
                || self
                    .full_path
                    .strip_suffix(query)
                    .map_or(false, |rest| rest.ends_with('/')))
    }
}

/// Keep only repositories inside `group_path`, preserving order.
pub fn filter_by_group(
    repositories: impl IntoIterator<Item = Repository>,
    group_path: &str,
) -> Vec<Repository> {
    repositories
        .into_iter()
        .filter(|repo| repo.is_in_group(group_path))
        .collect()
}

/// A provider group, organization or namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub full_path: String,
    pub provider: ProviderType,
}

impl Group {
    pub fn new(
        provider: ProviderType,
        id: impl Into<String>,
        name: impl Into<String>,
        full_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            full_path: full_path.into(),
            provider,
        }
    }
}
