//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::tips::TipPolicy;

/// gitfleet - batch operations over a tree of git working copies
#[derive(Parser, Debug)]
#[command(name = "gitfleet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the tip branches of every repository
    #[command(
        name = "tips",
        long_about = "List the tip branches of every repository under PATH.\n\n\
            A branch is a tip when its commit is not reachable from any other \
            branch. Every other branch is subsumed: its history is already \
            contained in another branch.",
        after_help = "\
EXAMPLES:
    # Tips of every repository under the current directory
    gitfleet tips

    # Show subsumed branches too
    gitfleet tips ~/src --all

    # Machine-readable output
    gitfleet tips ~/src --json"
    )]
    Tips {
        /// Directory to walk
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Also list branches that are not tips
        #[arg(long)]
        all: bool,

        /// How branches sharing a commit are compared (commit or ref)
        #[arg(long, value_name = "POLICY")]
        policy: Option<TipPolicy>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Delete every local branch that is not a tip
    #[command(
        name = "prune",
        long_about = "Delete every local branch that is not a tip.\n\n\
            A branch whose history is contained in another branch is deleted. \
            The checked-out branch is never deleted, and a branch that moved \
            since it was classified is left alone.",
        after_help = "\
EXAMPLES:
    # Preview what would be deleted
    gitfleet prune ~/src --dry-run

    # Delete subsumed branches
    gitfleet prune ~/src"
    )]
    Prune {
        /// Directory to walk
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,

        /// How branches sharing a commit are compared (commit or ref)
        #[arg(long, value_name = "POLICY")]
        policy: Option<TipPolicy>,
    },

    /// Fetch all remotes of every repository
    Fetch {
        /// Directory to walk
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Remove remote-tracking branches that no longer exist on the remote
        #[arg(long)]
        prune: bool,
    },

    /// Set user.name and user.email in every repository
    #[command(
        name = "author",
        after_help = "\
EXAMPLES:
    # Use the [author] section of the config file
    gitfleet author ~/work

    # Explicit identity
    gitfleet author ~/work --name 'Jane Doe' --email jane@example.com"
    )]
    Author {
        /// Directory to walk
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Value for user.name
        #[arg(long)]
        name: Option<String>,

        /// Value for user.email
        #[arg(long)]
        email: Option<String>,
    },

    /// Check out a branch in every repository that has it
    #[command(
        name = "checkout",
        long_about = "Check out BRANCH in every repository that has it.\n\n\
            A local branch is checked out directly. If only a remote-tracking \
            branch exists, a local branch tracking it is created. Repositories \
            without the branch are skipped.",
        after_help = "\
EXAMPLES:
    gitfleet checkout main ~/src
    gitfleet checkout release-2.0 --force"
    )]
    Checkout {
        /// Branch to check out
        branch: String,

        /// Directory to walk
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Check out even with uncommitted changes (git still refuses to
        /// overwrite conflicting changes)
        #[arg(long)]
        force: bool,
    },

    /// Rewrite remote URLs that start with a prefix
    #[command(
        name = "remote",
        after_help = "\
EXAMPLES:
    # Move every clone from an old host to a new one
    gitfleet remote ~/src --from git@old.example.com: --to git@new.example.com:"
    )]
    Remote {
        /// Directory to walk
        #[arg(default_value = ".")]
        path: PathBuf,

        /// URL prefix to replace
        #[arg(long, value_name = "PREFIX")]
        from: String,

        /// Replacement prefix
        #[arg(long, value_name = "PREFIX")]
        to: String,

        /// Remote to rewrite (default: config `remote`, else origin)
        #[arg(long, value_name = "NAME")]
        remote: Option<String>,
    },

    /// Clone every GitLab project you are a member of
    #[command(
        name = "clone",
        long_about = "Clone every GitLab project you are a member of into \
            PATH/<group>/<project>.\n\n\
            Projects whose destination already exists are skipped. The server \
            URL and token come from the flags, then the [gitlab] section of the \
            config file, then GITLAB_URL and GITLAB_TOKEN.",
        after_help = "\
EXAMPLES:
    GITLAB_TOKEN=glpat-xxx gitfleet clone ~/work --url https://gitlab.example.com
    gitfleet clone ~/work --https"
    )]
    Clone {
        /// Destination root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// GitLab base URL
        #[arg(long)]
        url: Option<String>,

        /// Personal access token
        #[arg(long)]
        token: Option<String>,

        /// Clone over HTTPS instead of SSH
        #[arg(long)]
        https: bool,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        after_help = "\
KEYS:
    tip_policy, remote, author.name, author.email,
    gitlab.url, gitlab.token, gitlab.https"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    gitfleet completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    gitfleet completion zsh >> ~/.zshrc

    # Fish
    gitfleet completion fish > ~/.config/fish/completions/gitfleet.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set one value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configured values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
