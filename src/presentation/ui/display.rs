use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::application::services::ProviderFailure;
use crate::application::use_cases::{
    CloneEvent, CloneSummary, ListedRepository, RepositoryListing, RepositoryOutcome,
    RepositoryTreeListing, StatusOutcome, TreeSelection,
};
use crate::common::verbosity::Verbosity;
use crate::domain::entities::{GroupNode, Repository, RepositoryTree};
use crate::infrastructure::git::LocalStatus;

/// Terminal output for the list and clone commands
#[derive(Debug, Clone, Copy)]
pub struct DisplayHelper {
    pub use_color: bool,
    pub verbosity: Verbosity,
}

impl DisplayHelper {
    pub fn new(use_color: bool, verbosity: Verbosity) -> Self {
        Self {
            use_color,
            verbosity,
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", "⚠️".yellow().bold(), message);
    }

    /// Report a provider that failed while others succeeded
    pub fn provider_failure(&self, failure: &ProviderFailure) {
        self.warning(&failure.to_string());
    }

    /// Spinner on stderr; hidden when output is not a terminal
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = if self.use_color {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
        } else {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        };

        if self.use_color {
            if let Ok(style) = ProgressStyle::default_spinner()
                .tick_strings(&["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈", ""])
                .template("{spinner:.green} {msg}")
            {
                pb.set_style(style);
            }
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(120));
        }

        pb
    }

    /// Flat listing with optional status lines
    pub fn print_listing(&self, listing: &RepositoryListing) {
        for failure in &listing.failures {
            self.provider_failure(failure);
        }

        println!("Found {} repositories:\n", listing.repositories.len());
        for listed in &listing.repositories {
            self.print_listed_repository(listed);
            println!();
        }
    }

    fn print_listed_repository(&self, listed: &ListedRepository) {
        let repo = &listed.repository;
        println!(
            "📁 [{}] {}",
            repo.provider.to_string().cyan(),
            repo.full_path.bold()
        );

        if self.verbosity.is_info() {
            println!("   Web URL: {}", repo.web_url);
            println!("   SSH URL: {}", repo.ssh_clone_url);
        }
        if self.verbosity.is_debug() {
            println!("   Clone URL: {}", repo.clone_url);
            println!("   Default Branch: {}", repo.default_branch);
            println!("   Local Path: {}", listed.local_path.display());
        }

        if let Some(status) = &listed.status {
            println!("   Status: {}", detailed_status(status));
        }
    }

    /// Tree listing, one section per provider
    pub fn print_tree_listing(&self, listing: &RepositoryTreeListing) {
        println!("Repository tree structure:");

        for provider in &listing.providers {
            println!(
                "\n{}",
                format!("=== {} Provider ===", provider.provider.display_name()).bold()
            );

            match &provider.selection {
                Err(e) => println!(
                    "{} Error building tree for {}: {}",
                    "❌".red(),
                    provider.provider,
                    e
                ),
                Ok(selection) => {
                    if let Some(group) = &listing.group_filter {
                        println!("(filtered by group: {})", group);
                    }
                    match selection {
                        TreeSelection::Whole(tree) => self.print_tree(tree, listing),
                        TreeSelection::Group(node) => self.print_group(node, 0, listing),
                        TreeSelection::GroupNotFound(group) => println!(
                            "Group '{}' not found in {}",
                            group, provider.provider
                        ),
                    }
                }
            }
        }
    }

    fn print_tree(&self, tree: &RepositoryTree, listing: &RepositoryTreeListing) {
        if !tree.repositories.is_empty() {
            println!("Root repositories:");
            for repo in &tree.repositories {
                self.print_tree_repository(repo, "", listing);
            }
        }
        for node in tree.groups.values() {
            self.print_group(node, 0, listing);
        }
    }

    fn print_group(&self, node: &GroupNode, indent: usize, listing: &RepositoryTreeListing) {
        let prefix = "  ".repeat(indent);
        println!("{}📂 {}/", prefix, node.group.name.blue().bold());

        let repo_prefix = format!("{prefix}  ");
        for repo in &node.repositories {
            self.print_tree_repository(repo, &repo_prefix, listing);
        }
        for child in node.sub_groups.values() {
            self.print_group(child, indent + 1, listing);
        }
    }

    fn print_tree_repository(&self, repo: &Repository, prefix: &str, listing: &RepositoryTreeListing) {
        let mut line = format!("{}📁 {}", prefix, repo.name);
        match listing.status_of(repo) {
            Some(Ok(status)) => {
                line.push_str(" - ");
                line.push_str(&compact_status(status, &repo.default_branch));
            }
            Some(Err(e)) => line.push_str(&format!(" - ❌ Error: {e}")),
            None => {}
        }
        println!("{line}");

        if self.verbosity.is_info() {
            println!("{}   Web URL: {}", prefix, repo.web_url);
            println!("{}   SSH URL: {}", prefix, repo.ssh_clone_url);
        }
    }

    /// Progress printer for the clone use case
    pub fn clone_progress(self) -> impl Fn(&CloneEvent<'_>) + Send + Sync {
        move |event| self.print_clone_event(event)
    }

    fn print_clone_event(&self, event: &CloneEvent<'_>) {
        match event {
            CloneEvent::ProviderFailed(failure) => self.provider_failure(failure),
            CloneEvent::Discovered { total, group } => match group {
                Some(group) => println!(
                    "{} Found {} repositories in group '{}' to clone/update\n",
                    "✅".green(),
                    total,
                    group
                ),
                None => println!("Found {} repositories to clone/update\n", total),
            },
            CloneEvent::Resolved { repository } => println!(
                "Found repository: {} [{}]",
                repository.full_path.bold(),
                repository.provider
            ),
            CloneEvent::Processing {
                index,
                total,
                repository,
            } => println!(
                "[{}/{}] Processing {} [{}]...",
                index,
                total,
                repository.full_path.bold(),
                repository.provider
            ),
            CloneEvent::Cloning { url } => println!("  📥 Cloning from {}...", url),
            CloneEvent::Pulling => println!("  🔄 Pulling latest changes..."),
            CloneEvent::Finished { outcome } => self.print_outcome(outcome),
        }
    }

    fn print_outcome(&self, outcome: &RepositoryOutcome) {
        match outcome {
            RepositoryOutcome::Cloned { path } => {
                println!("  {} Cloned successfully", "✅".green());
                if self.verbosity.is_info() {
                    println!("     Path: {}", path.display());
                }
            }
            RepositoryOutcome::Updated { .. } => {
                println!("  {} Updated successfully", "✅".green())
            }
            RepositoryOutcome::AlreadyCloned { path } => println!(
                "  ⏭️  Already cloned at {} (use --update to pull latest changes)",
                path.display()
            ),
            RepositoryOutcome::Failed { reason, .. } => {
                println!("  {} {}", "❌".red(), reason.red())
            }
        }
    }

    /// Final line of a batch clone
    pub fn print_clone_summary(&self, summary: &CloneSummary) {
        let failed = summary.failed();
        let failed_text = format!("{} failed", failed);
        println!(
            "\nSummary: {} successful, {}",
            summary.successful().to_string().green(),
            if failed > 0 {
                failed_text.red().to_string()
            } else {
                failed_text
            }
        );
    }
}

/// One-glyph status used in tree output
pub fn compact_status(status: &LocalStatus, default_branch: &str) -> String {
    if !status.exists {
        return "❌ Not cloned".to_string();
    }
    if !status.is_git_repo {
        return "⚠️ Not a git repo".to_string();
    }

    let mut result = "✅".to_string();
    if status.has_changes {
        result.push_str(" 🔄");
    }
    if let Some(branch) = status.current_branch.as_deref() {
        if !branch.is_empty() && !is_default_branch(branch, default_branch) {
            result.push_str(&format!(" ({branch})"));
        }
    }
    result
}

/// Status sentence used in flat output
pub fn detailed_status(status: &StatusOutcome) -> String {
    let status = match status {
        Ok(status) => status,
        Err(e) => return format!("❌ Error checking status: {e}"),
    };
    if !status.exists {
        return "❌ Not cloned".to_string();
    }
    if !status.is_git_repo {
        return "⚠️  Directory exists but not a git repository".to_string();
    }

    let mut result = "✅ Cloned".to_string();
    if let Some(branch) = status.current_branch.as_deref() {
        result.push_str(&format!(" (branch: {branch})"));
    }
    if status.has_changes {
        result.push_str(" 🔄 Has uncommitted changes");
    }
    result
}

fn is_default_branch(current: &str, default_branch: &str) -> bool {
    (!default_branch.is_empty() && current == default_branch)
        || current == "main"
        || current == "master"
}
