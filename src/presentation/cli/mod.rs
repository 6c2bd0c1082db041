pub mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::exit;
use tracing_subscriber::EnvFilter;

use crate::common::verbosity::Verbosity;
use crate::presentation::ui::DisplayHelper;
use commands::{
    CloneCommand, CommandContext, ConfigCommand, ConfigFlags, ListCommand, VersionCommand,
};

/// gitstuff - list, clone and update repositories across GitLab and GitHub
#[derive(Parser)]
#[command(name = "gitstuff")]
#[command(about = "List, clone and update repositories across GitLab and GitHub")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (-v, -vv, -vvv for increasing detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file (default is $HOME/.gitstuff.yaml)
    #[arg(long, global = true, env = "GITSTUFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure SCM provider settings
    Config {
        /// Provider type (gitlab or github); skips the interactive wizard
        #[arg(short, long)]
        provider: Option<String>,

        /// Provider name (identifier)
        #[arg(short, long)]
        name: Option<String>,

        /// Provider instance URL
        #[arg(short, long)]
        url: Option<String>,

        /// Access token
        #[arg(short, long)]
        token: Option<String>,

        /// Base directory for cloned repositories
        #[arg(short = 'd', long)]
        base_dir: Option<String>,

        /// Skip TLS certificate verification (self-signed certificates)
        #[arg(short = 'k', long)]
        insecure: bool,

        /// Default group or organization used to filter repositories
        #[arg(short, long)]
        group: Option<String>,
    },

    /// List all repositories from configured SCM providers
    List {
        /// Display repositories in tree structure with groups
        #[arg(short, long)]
        tree: bool,

        /// Show local repository status
        #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set,
              num_args = 0..=1, require_equals = true, default_missing_value = "true")]
        status: bool,

        /// Only list repositories in this group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Clone repositories (all, a group, or a single one)
    Clone {
        /// Repository path, path suffix, or group with --all
        target: Option<String>,

        /// Clone all repositories, or all in the given group
        #[arg(short, long)]
        all: bool,

        /// Use SSH for cloning (default)
        #[arg(short, long, default_value_t = true, action = clap::ArgAction::Set,
              num_args = 0..=1, require_equals = true, default_missing_value = "true")]
        ssh: bool,

        /// Use HTTPS for cloning
        #[arg(long)]
        https: bool,

        /// Pull latest changes for already cloned repositories
        #[arg(short, long)]
        update: bool,
    },

    /// Print the version of gitstuff
    Version,
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let verbosity = Verbosity::from_count(self.cli.verbose);
        init_tracing(verbosity);

        let use_color = !self.cli.no_color
            && atty::is(atty::Stream::Stdout)
            && std::env::var_os("NO_COLOR").is_none();
        colored::control::set_override(use_color);

        let context = CommandContext {
            config_path: self.cli.config.clone(),
            display: DisplayHelper::new(use_color, verbosity),
        };

        match self.handle_command(&context).await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self, context: &CommandContext) -> anyhow::Result<()> {
        match &self.cli.command {
            Commands::Config {
                provider,
                name,
                url,
                token,
                base_dir,
                insecure,
                group,
            } => {
                let flags = ConfigFlags {
                    provider: provider.clone(),
                    name: name.clone(),
                    url: url.clone(),
                    token: token.clone(),
                    base_dir: base_dir.clone(),
                    insecure: *insecure,
                    group: group.clone(),
                };
                ConfigCommand::new(flags).execute(context).await
            }
            Commands::List {
                tree,
                status,
                group,
            } => {
                ListCommand::new(*tree, *status, group.clone())
                    .execute(context)
                    .await
            }
            Commands::Clone {
                target,
                all,
                ssh,
                https,
                update,
            } => {
                let use_ssh = *ssh && !*https;
                CloneCommand::new(target.clone(), *all, use_ssh, *update)
                    .execute(context)
                    .await
            }
            Commands::Version => VersionCommand.execute(),
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over the `-v` level
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gitstuff={}", verbosity.filter_directive())));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity.is_trace())
        .try_init();
}
