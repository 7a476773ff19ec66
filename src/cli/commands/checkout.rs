//! checkout command - Check out a branch in every repository that has it

use std::path::Path;

use anyhow::{Context as _, Result};

use super::run_walk;
use crate::core::types::BranchName;
use crate::engine::{Context, RepoOperation};
use crate::git::{Git, GitError};
use crate::ui::output::{self, Verbosity};

/// Checks out one branch in each repository.
///
/// Repositories without the branch (locally or as a remote-tracking branch)
/// are counted in [`CheckoutOperation::missing`] and otherwise left alone.
#[derive(Debug)]
pub struct CheckoutOperation {
    branch: BranchName,
    force: bool,
    verbosity: Verbosity,
    missing: usize,
}

impl CheckoutOperation {
    pub fn new(branch: BranchName, force: bool, verbosity: Verbosity) -> Self {
        Self {
            branch,
            force,
            verbosity,
            missing: 0,
        }
    }

    /// Repositories that had no such branch.
    pub fn missing(&self) -> usize {
        self.missing
    }
}

impl RepoOperation for CheckoutOperation {
    fn name(&self) -> &str {
        "checkout"
    }

    fn process(&mut self, git: &Git, path: &Path) -> Result<()> {
        let state = git.state();
        if state.is_in_progress() {
            return Err(GitError::OperationInProgress { operation: state }.into());
        }

        if git.current_branch()?.as_ref() == Some(&self.branch) {
            tracing::debug!(path = %path.display(), branch = %self.branch, "already checked out");
            return Ok(());
        }

        let remote = if git.branch_exists(&self.branch) {
            None
        } else {
            match git.find_remote_tracking_branch(&self.branch)? {
                Some(remote) => Some(remote),
                None => {
                    tracing::info!(path = %path.display(), branch = %self.branch, "branch not found, skipping");
                    self.missing += 1;
                    return Ok(());
                }
            }
        };

        if !self.force {
            let status = git.worktree_status()?;
            if !status.is_clean() {
                return Err(GitError::DirtyWorktree {
                    details: status.describe(),
                }
                .into());
            }
        }

        let result = match &remote {
            None => git.checkout(&self.branch),
            Some(remote) => git.checkout_tracking(&self.branch, remote),
        };
        result.with_context(|| format!("Failed to check out {}", self.branch))?;

        let head = git.head_oid()?;
        let source = match &remote {
            Some(remote) => format!(" (tracking {}/{})", remote, self.branch),
            None => String::new(),
        };
        output::print(
            format!(
                "{}: {} at {}{}",
                path.display(),
                self.branch,
                head.short(7),
                source
            ),
            self.verbosity,
        );
        Ok(())
    }
}

/// Check out `branch` in every repository under `path`.
pub fn checkout(ctx: &Context, path: &Path, branch: &str, force: bool) -> Result<()> {
    let branch = BranchName::new(branch).context("Invalid branch name")?;
    let mut op = CheckoutOperation::new(branch, force, ctx.verbosity());
    run_walk(ctx, path, &mut op);

    if op.missing() > 0 {
        output::note(
            format!("{} repositories have no branch {}", op.missing(), op.branch),
            ctx.verbosity(),
        );
    }
    Ok(())
}
