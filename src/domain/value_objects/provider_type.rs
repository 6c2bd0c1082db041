use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::entities::repository_tree::GroupNesting;

/// Hosting service a repository listing comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// GitLab (gitlab.com or self-hosted), arbitrarily nested groups
    #[serde(alias = "GitLab", alias = "GITLAB")]
    Gitlab,
    /// GitHub (github.com or Enterprise), owner/name only
    #[serde(alias = "GitHub", alias = "GITHUB")]
    Github,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::Gitlab => write!(f, "gitlab"),
            ProviderType::Github => write!(f, "github"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = ProviderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gitlab" => Ok(ProviderType::Gitlab),
            "github" => Ok(ProviderType::Github),
            "" => Err(ProviderTypeError::Missing),
            _ => Err(ProviderTypeError::Unsupported(s.to_string())),
        }
    }
}

impl ProviderType {
    /// All supported providers, in the order the config wizard offers them
    pub const ALL: [ProviderType; 2] = [ProviderType::Gitlab, ProviderType::Github];

    /// How deep the tree builder nests groups for this provider
    pub fn group_nesting(&self) -> GroupNesting {
        match self {
            ProviderType::Gitlab => GroupNesting::Unlimited,
            // Owner or organization is the only grouping level
            ProviderType::Github => GroupNesting::MaxDepth(1),
        }
    }

    /// Upper-case label used in section headings
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderType::Gitlab => "GITLAB",
            ProviderType::Github => "GITHUB",
        }
    }

    /// Directory name under the base dir in the provider layout
    pub fn directory_name(&self) -> &'static str {
        match self {
            ProviderType::Gitlab => "gitlab",
            ProviderType::Github => "github",
        }
    }
}

/// Errors from parsing a provider type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderTypeError {
    /// No type was given
    Missing,
    /// The name is not a known provider
    Unsupported(String),
}

impl fmt::Display for ProviderTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderTypeError::Missing => write!(f, "provider type is required"),
            ProviderTypeError::Unsupported(name) => write!(
                f,
                "unsupported provider type: '{}'. Supported types are: gitlab, github",
                name
            ),
        }
    }
}

impl std::error::Error for ProviderTypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_from_str() {
        assert_eq!("gitlab".parse::<ProviderType>().unwrap(), ProviderType::Gitlab);
        assert_eq!("GitHub".parse::<ProviderType>().unwrap(), ProviderType::Github);
        assert_eq!(
            "bitbucket".parse::<ProviderType>(),
            Err(ProviderTypeError::Unsupported("bitbucket".to_string()))
        );
        assert_eq!("".parse::<ProviderType>(), Err(ProviderTypeError::Missing));
    }

    #[test]
    fn test_provider_type_display() {
        assert_eq!(ProviderType::Gitlab.to_string(), "gitlab");
        assert_eq!(ProviderType::Github.to_string(), "github");
        assert_eq!(ProviderType::Github.display_name(), "GITHUB");
    }

    #[test]
    fn test_group_nesting_policy() {
        assert_eq!(ProviderType::Gitlab.group_nesting(), GroupNesting::Unlimited);
        assert_eq!(ProviderType::Github.group_nesting(), GroupNesting::MaxDepth(1));
    }

    #[test]
    fn test_serde_lowercase() {
        let yaml = serde_yaml::to_string(&ProviderType::Github).unwrap();
        assert_eq!(yaml.trim(), "github");
        let parsed: ProviderType = serde_yaml::from_str("gitlab").unwrap();
        assert_eq!(parsed, ProviderType::Gitlab);
    }
}
