//! Test fixtures for creating test data
//!
//! Reusable repositories, provider API payloads and configuration files.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use gitstuff::domain::entities::Repository;
use gitstuff::domain::value_objects::ProviderType;

/// Repositories as a provider client would return them
pub struct RepositoryFixture;

impl RepositoryFixture {
    pub fn gitlab(full_path: &str) -> Repository {
        Repository::new(ProviderType::Gitlab, full_path, full_path)
            .with_clone_urls(
                format!("https://gitlab.com/{full_path}.git"),
                format!("git@gitlab.com:{full_path}.git"),
            )
            .with_default_branch("main")
            .with_web_url(format!("https://gitlab.com/{full_path}"))
    }

    pub fn github(full_path: &str) -> Repository {
        Repository::new(ProviderType::Github, full_path, full_path)
            .with_clone_urls(
                format!("https://github.com/{full_path}.git"),
                format!("git@github.com:{full_path}.git"),
            )
            .with_default_branch("main")
            .with_web_url(format!("https://github.com/{full_path}"))
    }

    /// The four-repository layout used across the tree tests
    pub fn team_layout() -> Vec<Repository> {
        ["team-a/api", "team-a/web", "team-a/backend/core", "team-b/tool"]
            .iter()
            .map(|p| Self::gitlab(p))
            .collect()
    }
}

/// JSON payloads in the shape of the provider REST APIs
pub struct ApiFixture;

impl ApiFixture {
    pub fn gitlab_project(id: u64, path_with_namespace: &str) -> serde_json::Value {
        let name = path_with_namespace.rsplit('/').next().unwrap_or_default();
        serde_json::json!({
            "id": id,
            "name": name,
            "path_with_namespace": path_with_namespace,
            "http_url_to_repo": format!("https://gitlab.example.com/{path_with_namespace}.git"),
            "ssh_url_to_repo": format!("git@gitlab.example.com:{path_with_namespace}.git"),
            "default_branch": "main",
            "web_url": format!("https://gitlab.example.com/{path_with_namespace}"),
        })
    }

    pub fn github_repo(id: u64, full_name: &str, private: bool, pull: bool) -> serde_json::Value {
        let name = full_name.rsplit('/').next().unwrap_or_default();
        serde_json::json!({
            "id": id,
            "name": name,
            "full_name": full_name,
            "clone_url": format!("https://github.com/{full_name}.git"),
            "ssh_url": format!("git@github.com:{full_name}.git"),
            "default_branch": "main",
            "html_url": format!("https://github.com/{full_name}"),
            "private": private,
            "permissions": { "pull": pull },
        })
    }
}

/// A temporary home directory with an optional config file in it
pub struct ConfigFixture {
    pub temp_dir: TempDir,
}

impl ConfigFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.home().join(".gitstuff.yaml")
    }

    /// Write `contents` as the config file and return its path
    pub fn write(&self, contents: &str) -> PathBuf {
        let path = self.config_path();
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn legacy_gitlab(&self) -> PathBuf {
        self.write(
            r#"
gitlab:
  url: https://gitlab.example.com
  token: glpat-legacy
  insecure: true
  group: platform
local:
  basedir: ~/src
"#,
        )
    }
}
