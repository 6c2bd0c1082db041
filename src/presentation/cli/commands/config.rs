use anyhow::{anyhow, Result};
use console::Term;
use std::io::{self, Write};
use tracing::debug;

use super::CommandContext;
use crate::domain::value_objects::ProviderType;
use crate::infrastructure::filesystem::{AddProviderRequest, ConfigStore};

const GITHUB_DEFAULT_URL: &str = "https://github.com";

/// Flags accepted by `gitstuff config`
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    pub provider: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub token: Option<String>,
    pub base_dir: Option<String>,
    pub insecure: bool,
    pub group: Option<String>,
}

/// Line-oriented input for the setup wizard
pub trait Prompt {
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Read without echo
    fn ask_secret(&mut self, question: &str) -> io::Result<String>;
}

impl Prompt for Term {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.write_str(question)?;
        self.flush()?;
        Ok(self.read_line()?.trim().to_string())
    }

    fn ask_secret(&mut self, question: &str) -> io::Result<String> {
        self.write_str(question)?;
        self.flush()?;
        Ok(self.read_secure_line()?.trim().to_string())
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Handler for the config command
pub struct ConfigCommand {
    pub flags: ConfigFlags,
}

impl ConfigCommand {
    pub fn new(flags: ConfigFlags) -> Self {
        Self { flags }
    }

    pub async fn execute(&self, context: &CommandContext) -> Result<()> {
        let store = context.config_store()?;

        if self.flags.provider.is_some() {
            debug!("Running config in non-interactive mode");
            let request = self.request_from_flags()?;
            save_provider(&store, request)?;
            return Ok(());
        }

        debug!("Running config in interactive mode");
        let mut term = Term::stdout();
        let mut first = true;
        loop {
            let request = self.wizard_request(&mut term, first)?;
            save_provider(&store, request)?;
            first = false;

            let again = term.ask("Would you like to add another provider? (y/N): ")?;
            if !is_yes(&again) {
                break;
            }
        }

        println!("Configuration complete!");
        Ok(())
    }

    /// Provider settings taken from flags alone
    pub fn request_from_flags(&self) -> Result<AddProviderRequest> {
        let provider_type: ProviderType = self
            .flags
            .provider
            .as_deref()
            .unwrap_or_default()
            .parse()?;

        let url = non_empty(self.flags.url.as_ref()).or_else(|| {
            (provider_type == ProviderType::Github).then(|| GITHUB_DEFAULT_URL.to_string())
        });

        Ok(AddProviderRequest {
            name: non_empty(self.flags.name.as_ref()).unwrap_or_else(|| provider_type.to_string()),
            provider_type: provider_type.to_string(),
            url: url.unwrap_or_default(),
            token: self.flags.token.clone().unwrap_or_default(),
            insecure: self.flags.insecure,
            group: non_empty(self.flags.group.as_ref()),
            base_dir: non_empty(self.flags.base_dir.as_ref()),
        })
    }

    /// Ask for whatever the flags left out. The base directory is only
    /// asked for on the first round.
    pub fn wizard_request<P: Prompt>(&self, prompt: &mut P, first: bool) -> Result<AddProviderRequest> {
        println!("Available SCM providers:");
        println!("1. GitLab");
        println!("2. GitHub");
        let choice = prompt.ask("Select a provider (1-2): ")?;
        let provider_type = match choice.as_str() {
            "1" => ProviderType::Gitlab,
            "2" => ProviderType::Github,
            other => other
                .parse()
                .map_err(|_| anyhow!("invalid selection: {}", other))?,
        };

        let name = match non_empty(self.flags.name.as_ref()).filter(|_| first) {
            Some(name) => name,
            None => {
                let answer = prompt.ask(&format!(
                    "Provider name (identifier for this {} instance): ",
                    provider_type
                ))?;
                if answer.is_empty() {
                    provider_type.to_string()
                } else {
                    answer
                }
            }
        };

        let url = match provider_type {
            ProviderType::Gitlab => {
                prompt.ask("GitLab URL (e.g., https://gitlab.com or gitlab.example.com): ")?
            }
            ProviderType::Github => {
                let answer = prompt.ask(
                    "GitHub URL (leave blank for github.com or enter GitHub Enterprise URL): ",
                )?;
                if answer.is_empty() {
                    GITHUB_DEFAULT_URL.to_string()
                } else {
                    answer
                }
            }
        };

        let token = match provider_type {
            ProviderType::Gitlab => prompt.ask_secret("GitLab Access Token: ")?,
            ProviderType::Github => prompt.ask_secret("GitHub Personal Access Token: ")?,
        };

        let base_dir = if first {
            match non_empty(self.flags.base_dir.as_ref()) {
                Some(dir) => Some(dir),
                None => {
                    let answer =
                        prompt.ask("Base directory for repositories (default: ~/gitstuff-repos): ")?;
                    Some(answer).filter(|a| !a.is_empty())
                }
            }
        } else {
            None
        };

        let insecure = if self.flags.insecure {
            true
        } else if provider_type == ProviderType::Gitlab {
            is_yes(&prompt.ask("Skip SSL certificate verification? (y/N): ")?)
        } else {
            false
        };

        let group_question = match provider_type {
            ProviderType::Gitlab => {
                "Default GitLab group to filter repositories (optional, leave blank for all): "
            }
            ProviderType::Github => {
                "Default GitHub organization to filter repositories (optional, leave blank for all): "
            }
        };
        let group = Some(prompt.ask(group_question)?).filter(|g| !g.is_empty());

        Ok(AddProviderRequest {
            name,
            provider_type: provider_type.to_string(),
            url,
            token,
            insecure,
            group,
            base_dir,
        })
    }
}

fn save_provider(store: &ConfigStore, request: AddProviderRequest) -> Result<()> {
    let name = request.name.clone();
    let config = store.add_provider(request)?;
    println!(
        "✅ Provider '{}' saved to {} ({} configured)",
        name,
        store.path().display(),
        config.providers.len()
    );
    let _ = io::stdout().flush();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedPrompt {
        answers: VecDeque<&'static str>,
        secrets: usize,
    }

    impl ScriptedPrompt {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                secrets: 0,
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn ask(&mut self, _question: &str) -> io::Result<String> {
            self.answers
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }

        fn ask_secret(&mut self, question: &str) -> io::Result<String> {
            self.secrets += 1;
            self.ask(question)
        }
    }

    #[test]
    fn test_wizard_gitlab_first_round() {
        let mut prompt = ScriptedPrompt::new(&[
            "1",
            "work",
            "gitlab.example.com",
            "glpat-secret",
            "~/code",
            "y",
            "platform",
        ]);
        let request = ConfigCommand::new(ConfigFlags::default())
            .wizard_request(&mut prompt, true)
            .unwrap();

        assert_eq!(request.name, "work");
        assert_eq!(request.provider_type, "gitlab");
        assert_eq!(request.url, "gitlab.example.com");
        assert_eq!(request.token, "glpat-secret");
        assert_eq!(request.base_dir.as_deref(), Some("~/code"));
        assert!(request.insecure);
        assert_eq!(request.group.as_deref(), Some("platform"));
        assert_eq!(prompt.secrets, 1);
        assert!(prompt.answers.is_empty());
    }

    #[test]
    fn test_wizard_github_later_round_uses_defaults() {
        // no base dir or TLS question for a second GitHub provider
        let mut prompt = ScriptedPrompt::new(&["2", "", "", "ghp_token", ""]);
        let request = ConfigCommand::new(ConfigFlags::default())
            .wizard_request(&mut prompt, false)
            .unwrap();

        assert_eq!(request.name, "github");
        assert_eq!(request.url, GITHUB_DEFAULT_URL);
        assert!(request.base_dir.is_none());
        assert!(!request.insecure);
        assert!(request.group.is_none());
    }

    #[test]
    fn test_wizard_rejects_unknown_selection() {
        let mut prompt = ScriptedPrompt::new(&["3"]);
        let err = ConfigCommand::new(ConfigFlags::default())
            .wizard_request(&mut prompt, true)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid selection: 3");
    }

    #[test]
    fn test_request_from_flags() {
        let flags = ConfigFlags {
            provider: Some("github".to_string()),
            token: Some("ghp_x".to_string()),
            group: Some("  ".to_string()),
            ..ConfigFlags::default()
        };
        let request = ConfigCommand::new(flags).request_from_flags().unwrap();
        assert_eq!(request.name, "github");
        assert_eq!(request.url, GITHUB_DEFAULT_URL);
        assert!(request.group.is_none());
    }

    #[test]
    fn test_request_from_flags_rejects_unknown_provider() {
        let flags = ConfigFlags {
            provider: Some("bitbucket".to_string()),
            ..ConfigFlags::default()
        };
        let err = ConfigCommand::new(flags).request_from_flags().unwrap_err();
        assert!(err.to_string().contains("unsupported provider type"));
    }
}
