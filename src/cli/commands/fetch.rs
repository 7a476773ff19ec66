//! fetch command - Fetch all remotes of every repository

use std::path::Path;

use anyhow::{Context as _, Result};

use super::run_walk;
use crate::engine::{Context, RepoOperation};
use crate::git::Git;
use crate::ui::output::{self, Verbosity};

/// Runs `git fetch --all` in each repository.
#[derive(Debug)]
pub struct FetchOperation {
    prune: bool,
    verbosity: Verbosity,
}

impl FetchOperation {
    pub fn new(prune: bool, verbosity: Verbosity) -> Self {
        Self { prune, verbosity }
    }
}

impl RepoOperation for FetchOperation {
    fn name(&self) -> &str {
        "fetch"
    }

    fn process(&mut self, git: &Git, path: &Path) -> Result<()> {
        if git.remote_names()?.is_empty() {
            tracing::debug!(path = %path.display(), "no remotes, nothing to fetch");
            return Ok(());
        }

        git.fetch_all(self.prune).context("Fetch failed")?;
        output::print(format!("fetched {}", path.display()), self.verbosity);
        Ok(())
    }
}

/// Fetch every repository under `path`.
pub fn fetch(ctx: &Context, path: &Path, prune: bool) -> Result<()> {
    let mut op = FetchOperation::new(prune, ctx.verbosity());
    run_walk(ctx, path, &mut op);
    Ok(())
}
