use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use super::{connect, CommandContext};
use crate::application::use_cases::{
    CloneRepositoriesConfig, CloneRepositoriesUseCase, CloneTarget,
};
use crate::infrastructure::git::GitCli;

/// Handler for the clone command
pub struct CloneCommand {
    pub target: Option<String>,
    pub all: bool,
    pub use_ssh: bool,
    pub update: bool,
}

impl CloneCommand {
    pub fn new(target: Option<String>, all: bool, use_ssh: bool, update: bool) -> Self {
        Self {
            target,
            all,
            use_ssh,
            update,
        }
    }

    /// `--all` with an argument clones a group; a bare argument is a single
    /// repository; no argument clones everything.
    pub fn clone_target(&self) -> CloneTarget {
        match (self.all, self.target.as_deref().filter(|t| !t.is_empty())) {
            (_, None) => CloneTarget::All,
            (true, Some(group)) => CloneTarget::Group(group.to_string()),
            (false, Some(query)) => CloneTarget::Single(query.to_string()),
        }
    }

    pub async fn execute(&self, context: &CommandContext) -> Result<()> {
        let connected = connect(context)?;
        let target = self.clone_target();
        debug!(
            ?target,
            ssh = self.use_ssh,
            update = self.update,
            "Starting clone operation"
        );

        let config = CloneRepositoriesConfig::new(target.clone())
            .with_ssh(self.use_ssh)
            .with_update(self.update);
        let display = context.display;
        let use_case = CloneRepositoriesUseCase::new(
            connected.service,
            Arc::new(GitCli::new()),
            connected.resolver,
            config,
        )
        .with_progress(display.clone_progress());

        let summary = use_case.execute().await?;
        if !matches!(target, CloneTarget::Single(_)) {
            display.print_clone_summary(&summary);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(arg: Option<&str>, all: bool) -> CloneTarget {
        CloneCommand::new(arg.map(str::to_string), all, true, false).clone_target()
    }

    #[test]
    fn test_clone_target_selection() {
        assert_eq!(target(None, false), CloneTarget::All);
        assert_eq!(target(None, true), CloneTarget::All);
        assert_eq!(
            target(Some("team-a"), true),
            CloneTarget::Group("team-a".to_string())
        );
        assert_eq!(
            target(Some("team-a/api"), false),
            CloneTarget::Single("team-a/api".to_string())
        );
    }
}
