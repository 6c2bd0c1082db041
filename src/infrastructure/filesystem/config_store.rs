use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

use crate::domain::value_objects::ProviderType;

/// File name of the configuration in the home directory
pub const CONFIG_FILE_NAME: &str = ".gitstuff.yaml";

/// Base directory name used when none is configured
pub const DEFAULT_BASE_DIR_NAME: &str = "gitstuff-repos";

/// Name given to the provider migrated from a legacy file
pub const LEGACY_PROVIDER_NAME: &str = "gitlab";

/// Configuration store related errors
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("configuration file not found at {}", .0.display())]
    ConfigFileNotFound(PathBuf),

    #[error("could not determine the home directory")]
    NoHomeDirectory,

    #[error("failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file {}: {source}", path.display())]
    YamlParsingFailed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("YAML serialization failed: {0}")]
    YamlSerializationFailed(#[from] serde_yaml::Error),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("no providers configured")]
    NoProviders,
}

/// One configured hosting provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub provider_type: ProviderType,

    pub url: String,

    pub token: String,

    #[serde(default)]
    pub insecure: bool,

    /// Default group filter for `list`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalConfig {
    pub base_dir: PathBuf,
}

/// Loaded configuration, always in the current multi-provider shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub providers: Vec<ProviderConfig>,
    pub local: LocalConfig,
}

impl AppConfig {
    fn empty(home_dir: &Path) -> Self {
        Self {
            providers: Vec::new(),
            local: LocalConfig {
                base_dir: default_base_dir(home_dir),
            },
        }
    }

    /// Fail with [`ConfigStoreError::NoProviders`] when nothing is configured
    pub fn require_providers(&self) -> Result<&[ProviderConfig], ConfigStoreError> {
        if self.providers.is_empty() {
            return Err(ConfigStoreError::NoProviders);
        }
        Ok(&self.providers)
    }

    /// Group filter of the first provider that has one
    pub fn default_group(&self) -> Option<&str> {
        self.providers
            .iter()
            .filter_map(|p| p.group.as_deref())
            .find(|g| !g.is_empty())
    }
}

/// Input for [`ConfigStore::add_provider`], straight from the user
#[derive(Debug, Clone, Default, Validate)]
pub struct AddProviderRequest {
    #[validate(length(min = 1, message = "provider name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "provider type is required"))]
    pub provider_type: String,

    #[validate(length(min = 1, message = "provider URL is required"))]
    pub url: String,

    #[validate(length(min = 1, message = "provider token is required"))]
    pub token: String,

    pub insecure: bool,

    pub group: Option<String>,

    /// New base directory; `None` or empty keeps the current one
    pub base_dir: Option<String>,
}

impl AddProviderRequest {
    fn into_provider(self) -> Result<(ProviderConfig, Option<String>), ConfigStoreError> {
        self.validate().map_err(|errors| {
            ConfigStoreError::ValidationFailed(first_validation_message(
                &errors,
                &["name", "provider_type", "url", "token"],
            ))
        })?;

        let provider_type: ProviderType = self
            .provider_type
            .parse()
            .map_err(|e: crate::domain::value_objects::ProviderTypeError| {
                ConfigStoreError::ValidationFailed(e.to_string())
            })?;

        let provider = ProviderConfig {
            name: self.name.trim().to_string(),
            provider_type,
            url: self.url.trim().to_string(),
            token: self.token.trim().to_string(),
            insecure: self.insecure,
            group: self.group.map(|g| g.trim().to_string()).filter(|g| !g.is_empty()),
        };
        Ok((provider, self.base_dir))
    }
}

/// First message among `fields`, checked in the given order
fn first_validation_message(errors: &ValidationErrors, fields: &[&str]) -> String {
    let field_errors = errors.field_errors();
    fields
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .filter_map(|errs| errs.first())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

// On-disk shapes. The current shape has a `providers` list; the legacy
// shape has a single `gitlab` block.

#[derive(Debug, Default, Deserialize)]
struct LocalSection {
    #[serde(default, alias = "basedir")]
    base_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentConfigFile {
    #[serde(default)]
    providers: Vec<ProviderConfig>,
    #[serde(default)]
    local: LocalSection,
}

#[derive(Debug, Deserialize)]
struct LegacyGitLabSection {
    #[serde(default)]
    url: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    insecure: bool,
    #[serde(default)]
    group: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyConfigFile {
    gitlab: LegacyGitLabSection,
    #[serde(default)]
    local: LocalSection,
}

impl LegacyConfigFile {
    fn migrate(self) -> CurrentConfigFile {
        let provider = ProviderConfig {
            name: LEGACY_PROVIDER_NAME.to_string(),
            provider_type: ProviderType::Gitlab,
            url: self.gitlab.url,
            token: self.gitlab.token,
            insecure: self.gitlab.insecure,
            group: self.gitlab.group.filter(|g| !g.is_empty()),
        };
        CurrentConfigFile {
            providers: vec![provider],
            local: self.local,
        }
    }
}

/// `~/gitstuff-repos`
pub fn default_base_dir(home_dir: &Path) -> PathBuf {
    home_dir.join(DEFAULT_BASE_DIR_NAME)
}

/// Expand a leading `~` against `home_dir`
fn expand_home(path: &str, home_dir: &Path) -> PathBuf {
    if path == "~" {
        home_dir.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home_dir.join(rest)
    } else {
        PathBuf::from(path)
    }
}

fn resolve_base_dir(raw: Option<&str>, home_dir: &Path) -> PathBuf {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(dir) => expand_home(dir, home_dir),
        None => default_base_dir(home_dir),
    }
}

/// Parse configuration text in either shape.
pub fn parse_config(contents: &str, home_dir: &Path) -> Result<AppConfig, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
    if value.is_null() {
        return Ok(AppConfig::empty(home_dir));
    }

    let file = if value.get("providers").is_none() && value.get("gitlab").is_some() {
        debug!("Migrating legacy single-provider configuration");
        serde_yaml::from_value::<LegacyConfigFile>(value)?.migrate()
    } else {
        serde_yaml::from_value::<CurrentConfigFile>(value)?
    };

    Ok(AppConfig {
        providers: file.providers,
        local: LocalConfig {
            base_dir: resolve_base_dir(file.local.base_dir.as_deref(), home_dir),
        },
    })
}

/// Reads and writes the YAML configuration file
pub struct ConfigStore {
    path: PathBuf,
    home_dir: PathBuf,
}

impl ConfigStore {
    /// Store at an explicit path; `home_dir` anchors the default base dir
    pub fn new(path: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            home_dir: home_dir.into(),
        }
    }

    /// Store at `path`, or `~/.gitstuff.yaml` when `None`
    pub fn locate(path: Option<PathBuf>) -> Result<Self, ConfigStoreError> {
        let home_dir = dirs::home_dir().ok_or(ConfigStoreError::NoHomeDirectory)?;
        let path = path.unwrap_or_else(|| home_dir.join(CONFIG_FILE_NAME));
        Ok(Self::new(path, home_dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the configuration; a missing file is an error
    pub fn load(&self) -> Result<AppConfig, ConfigStoreError> {
        if !self.path.exists() {
            return Err(ConfigStoreError::ConfigFileNotFound(self.path.clone()));
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| {
            ConfigStoreError::ReadFailed {
                path: self.path.clone(),
                source,
            }
        })?;
        parse_config(&contents, &self.home_dir).map_err(|source| {
            ConfigStoreError::YamlParsingFailed {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Load the configuration, or an empty one when the file is missing
    pub fn load_or_default(&self) -> Result<AppConfig, ConfigStoreError> {
        if self.path.exists() {
            self.load()
        } else {
            Ok(AppConfig::empty(&self.home_dir))
        }
    }

    /// Write the configuration in the current shape, readable only by the
    /// owner on Unix
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigStoreError> {
        let yaml_content = serde_yaml::to_string(config)?;
        let write_failed = |source| ConfigStoreError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(write_failed)?;
        file.write_all(yaml_content.as_bytes()).map_err(write_failed)?;

        #[cfg(unix)]
        {
            // mode() only applies to newly created files
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(write_failed)?;
        }

        info!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }

    /// Validate and add a provider, replacing one with the same name, then
    /// save. Returns the saved configuration.
    pub fn add_provider(&self, request: AddProviderRequest) -> Result<AppConfig, ConfigStoreError> {
        let (provider, base_dir) = request.into_provider()?;
        let mut config = self.load_or_default()?;

        if let Some(dir) = base_dir.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            config.local.base_dir = expand_home(dir, &self.home_dir);
        }

        match config.providers.iter_mut().find(|p| p.name == provider.name) {
            Some(existing) => {
                debug!(name = %provider.name, "Replacing existing provider");
                *existing = provider;
            }
            None => config.providers.push(provider),
        }

        self.save(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn request(name: &str, provider_type: &str, url: &str, token: &str) -> AddProviderRequest {
        AddProviderRequest {
            name: name.to_string(),
            provider_type: provider_type.to_string(),
            url: url.to_string(),
            token: token.to_string(),
            ..AddProviderRequest::default()
        }
    }

    fn store(temp_dir: &TempDir) -> ConfigStore {
        ConfigStore::new(temp_dir.path().join(CONFIG_FILE_NAME), temp_dir.path())
    }

    #[test]
    fn test_parse_current_shape() {
        let yaml = r#"
providers:
  - name: gitlab-main
    type: gitlab
    url: https://gitlab.com
    token: gl-token
    group: my-group
  - name: github-enterprise
    type: github
    url: https://github.enterprise.com
    token: gh-token
    insecure: true
local:
  base_dir: /repos
"#;
        let config = parse_config(yaml, Path::new("/home/me")).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].provider_type, ProviderType::Gitlab);
        assert_eq!(config.providers[1].provider_type, ProviderType::Github);
        assert!(config.providers[1].insecure);
        assert_eq!(config.local.base_dir, PathBuf::from("/repos"));
        assert_eq!(config.default_group(), Some("my-group"));
    }

    #[test]
    fn test_parse_legacy_shape() {
        let yaml = r#"
gitlab:
  url: https://gitlab.legacy.com
  token: legacy-token
  insecure: true
  group: legacy-group
local:
  basedir: /legacy/dir
"#;
        let config = parse_config(yaml, Path::new("/home/me")).unwrap();
        assert_eq!(
            config.providers,
            vec![ProviderConfig {
                name: "gitlab".to_string(),
                provider_type: ProviderType::Gitlab,
                url: "https://gitlab.legacy.com".to_string(),
                token: "legacy-token".to_string(),
                insecure: true,
                group: Some("legacy-group".to_string()),
            }]
        );
        assert_eq!(config.local.base_dir, PathBuf::from("/legacy/dir"));
    }

    #[test]
    fn test_empty_base_dir_defaults_under_home() {
        let config = parse_config("providers: []\n", Path::new("/home/me")).unwrap();
        assert_eq!(config.local.base_dir, PathBuf::from("/home/me/gitstuff-repos"));

        let config = parse_config("", Path::new("/home/me")).unwrap();
        assert!(config.providers.is_empty());
        assert!(matches!(
            config.require_providers(),
            Err(ConfigStoreError::NoProviders)
        ));
    }

    #[test]
    fn test_tilde_base_dir_is_expanded() {
        let config =
            parse_config("local:\n  base_dir: ~/code\n", Path::new("/home/me")).unwrap();
        assert_eq!(config.local.base_dir, PathBuf::from("/home/me/code"));
    }

    #[test]
    fn test_unknown_provider_type_fails_to_parse() {
        let yaml = "providers:\n  - {name: x, type: bitbucket, url: u, token: t}\n";
        assert!(parse_config(yaml, Path::new("/home/me")).is_err());
    }

    #[test]
    fn test_add_provider_validation_messages() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let cases = [
            (request("", "gitlab", "u", "t"), "provider name is required"),
            (request("n", "", "u", "t"), "provider type is required"),
            (request("n", "bitbucket", "u", "t"), "unsupported provider type"),
            (request("n", "gitlab", "", "t"), "provider URL is required"),
            (request("n", "gitlab", "u", ""), "provider token is required"),
        ];
        for (req, expected) in cases {
            let err = store.add_provider(req).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "expected '{expected}', got '{err}'"
            );
        }
        assert!(!store.exists());
    }

    #[test]
    fn test_add_provider_keeps_base_dir_and_replaces_by_name() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let mut first = request("gitlab-main", "gitlab", "https://gitlab.com", "gl-token");
        first.base_dir = Some("/shared/dir".to_string());
        store.add_provider(first).unwrap();

        let mut second = request("github-main", "github", "https://github.com", "gh-token");
        second.insecure = true;
        second.group = Some("my-org".to_string());
        store.add_provider(second).unwrap();

        let replaced = request("gitlab-main", "gitlab", "https://gitlab.example.com", "new");
        let config = store.add_provider(replaced).unwrap();

        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].url, "https://gitlab.example.com");
        assert_eq!(config.local.base_dir, PathBuf::from("/shared/dir"));
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn test_first_provider_without_base_dir_gets_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let config = store
            .add_provider(request("github-main", "github", "https://github.com", "t"))
            .unwrap();
        assert_eq!(config.local.base_dir, temp_dir.path().join("gitstuff-repos"));
    }

    #[test]
    fn test_saving_legacy_file_rewrites_current_shape() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        fs::write(
            store.path(),
            "gitlab:\n  url: https://gitlab.com\n  token: t\nlocal:\n  basedir: /legacy\n",
        )
        .unwrap();

        let config = store
            .add_provider(request("github-main", "github", "github.com", "t2"))
            .unwrap();
        assert_eq!(config.providers[0].name, "gitlab");

        let written = fs::read_to_string(store.path()).unwrap();
        assert!(written.contains("providers:"));
        assert!(!written.contains("basedir"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store
            .add_provider(request("g", "gitlab", "gitlab.com", "t"))
            .unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        assert!(matches!(
            store.load(),
            Err(ConfigStoreError::ConfigFileNotFound(_))
        ));
        assert!(store.load_or_default().unwrap().providers.is_empty());
    }
}
