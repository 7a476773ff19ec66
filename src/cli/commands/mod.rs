//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each walker-based command handler:
//! 1. Resolves command-specific arguments against the configuration
//! 2. Builds a [`RepoOperation`] and runs it through the [`RepoWalker`]
//! 3. Prints failures as they occur, then a one-line summary
//!
//! A completed walk returns `Ok(())` whatever happened in individual
//! repositories; only argument and configuration errors fail the command.
//!
//! # Async Commands
//!
//! `clone` lists projects over HTTP. It builds a tokio runtime and blocks on
//! the listing before any clone starts.

mod author;
mod checkout;
mod clone;
mod completion;
mod config_cmd;
mod fetch;
mod prune;
mod remote;
mod tips;

pub use author::{author, AuthorOperation};
pub use checkout::{checkout, CheckoutOperation};
pub use clone::{clone, clone_projects};
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use fetch::{fetch, FetchOperation};
pub use prune::{prune, PruneOperation};
pub use remote::{remote, RemoteOperation};
pub use tips::{tips, RepoTips, TipsOperation};

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, ConfigAction};
use crate::core::config::Config;
use crate::engine::{CandidateReport, Context, RepoOperation, RepoWalker, WalkReport};
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Completion { shell } => completion(shell),
        Command::Config { action } => {
            let config = load_config()?;
            match action {
                ConfigAction::Get { key } => config_get(&config, &key),
                ConfigAction::Set { key, value } => config_set(ctx, config, &key, &value),
                ConfigAction::List => config_list(&config),
            }
        }
        Command::Tips {
            path,
            all,
            policy,
            json,
        } => {
            let config = load_config()?;
            tips(ctx, &path, policy.unwrap_or(config.tip_policy()), all, json)
        }
        Command::Prune {
            path,
            dry_run,
            policy,
        } => {
            let config = load_config()?;
            prune(ctx, &path, policy.unwrap_or(config.tip_policy()), dry_run)
        }
        Command::Fetch { path, prune } => fetch(ctx, &path, prune),
        Command::Author { path, name, email } => {
            let config = load_config()?;
            author(ctx, &config, &path, name, email)
        }
        Command::Checkout {
            branch,
            path,
            force,
        } => checkout(ctx, &path, &branch, force),
        Command::Remote {
            path,
            from,
            to,
            remote: remote_name,
        } => {
            let config = load_config()?;
            let remote_name = remote_name.unwrap_or_else(|| config.remote().to_string());
            remote(ctx, &path, &remote_name, &from, &to)
        }
        Command::Clone {
            path,
            url,
            token,
            https,
        } => {
            let config = load_config()?;
            clone(ctx, &config, &path, url, token, https)
        }
    }
}

fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Walk `path` with `op`, reporting failures as they occur and a summary at
/// the end.
pub(crate) fn run_walk<O>(ctx: &Context, path: &Path, op: &mut O) -> WalkReport
where
    O: RepoOperation + ?Sized,
{
    let walker = RepoWalker::new(path);
    let report = walker.run_with(op, report_failure);
    output::note(report.summary(), ctx.verbosity());
    report
}

/// Print a candidate's failure report, if it failed.
pub(crate) fn report_failure(candidate: &CandidateReport) {
    if let Some(text) = candidate.failure_report() {
        output::failure(text);
    }
}
