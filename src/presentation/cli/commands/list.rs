use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use super::{connect, CommandContext};
use crate::application::use_cases::{ListRepositoriesConfig, ListRepositoriesUseCase};
use crate::infrastructure::git::GitCli;

/// Handler for the list command
pub struct ListCommand {
    pub tree: bool,
    pub show_status: bool,
    /// `--group`; falls back to the first provider's default group
    pub group: Option<String>,
}

impl ListCommand {
    pub fn new(tree: bool, show_status: bool, group: Option<String>) -> Self {
        Self {
            tree,
            show_status,
            group,
        }
    }

    pub async fn execute(&self, context: &CommandContext) -> Result<()> {
        let connected = connect(context)?;

        let group = self
            .group
            .clone()
            .filter(|g| !g.is_empty())
            .or_else(|| connected.config.default_group().map(str::to_string));
        debug!(tree = self.tree, status = self.show_status, ?group, "Listing repositories");

        let config = ListRepositoriesConfig::default()
            .with_group(group)
            .with_status(self.show_status);
        let use_case = ListRepositoriesUseCase::new(
            connected.service,
            Arc::new(GitCli::new()),
            connected.resolver,
            config,
        );

        let display = &context.display;
        let spinner = display.create_spinner("Fetching repositories...");
        if self.tree {
            let listing = use_case.execute_tree().await;
            spinner.finish_and_clear();
            display.print_tree_listing(&listing);
        } else {
            let listing = use_case.execute().await;
            spinner.finish_and_clear();
            display.print_listing(&listing);
        }

        Ok(())
    }
}
