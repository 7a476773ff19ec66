//! remote command - Rewrite remote URL prefixes

use std::path::Path;

use anyhow::{bail, Result};

use super::run_walk;
use crate::core::config::schema::validate_remote_name;
use crate::engine::{Context, RepoOperation};
use crate::git::Git;
use crate::ui::output::{self, Verbosity};

/// Replaces a URL prefix on one named remote in each repository.
#[derive(Debug)]
pub struct RemoteOperation {
    remote: String,
    from: String,
    to: String,
    verbosity: Verbosity,
    changed: usize,
}

impl RemoteOperation {
    pub fn new(remote: &str, from: &str, to: &str, verbosity: Verbosity) -> Result<Self> {
        validate_remote_name(remote)?;
        if from.is_empty() {
            bail!("--from must not be empty");
        }
        Ok(Self {
            remote: remote.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            verbosity,
            changed: 0,
        })
    }

    /// The rewritten URL, if `url` starts with the prefix.
    pub fn rewrite(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.from)
            .map(|rest| format!("{}{}", self.to, rest))
    }

    /// Number of remotes rewritten so far.
    pub fn changed(&self) -> usize {
        self.changed
    }
}

impl RepoOperation for RemoteOperation {
    fn name(&self) -> &str {
        "remote"
    }

    fn process(&mut self, git: &Git, path: &Path) -> Result<()> {
        let Some(url) = git.remote_url(&self.remote)? else {
            tracing::debug!(path = %path.display(), remote = %self.remote, "no such remote");
            return Ok(());
        };

        let Some(new_url) = self.rewrite(&url) else {
            return Ok(());
        };

        git.set_remote_url(&self.remote, &new_url)?;
        self.changed += 1;
        output::print(
            format!("{}: {} -> {}", path.display(), url, new_url),
            self.verbosity,
        );
        Ok(())
    }
}

/// Rewrite `remote`'s URL prefix in every repository under `path`.
pub fn remote(ctx: &Context, path: &Path, remote: &str, from: &str, to: &str) -> Result<()> {
    let mut op = RemoteOperation::new(remote, from, to, ctx.verbosity())?;
    run_walk(ctx, path, &mut op);
    output::note(format!("{} remotes rewritten", op.changed()), ctx.verbosity());
    Ok(())
}
