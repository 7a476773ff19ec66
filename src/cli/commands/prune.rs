//! prune command - Delete local branches that are not tips

use std::path::Path;

use anyhow::{Context as _, Result};

use super::run_walk;
use crate::core::tips::{ancestor_sets, is_tip, removable, TipPolicy};
use crate::core::types::BranchName;
use crate::engine::{Context, RepoOperation};
use crate::git::Git;
use crate::ui::output::{self, Verbosity};

/// Deletes subsumed branches in each repository.
///
/// The checked-out branch is kept even when subsumed, and no deletion
/// leaves a commit unreachable from every remaining branch. Each deletion
/// is a compare-and-swap against the commit seen during classification, so
/// a branch that moved in the meantime makes the repository fail instead of
/// losing work.
#[derive(Debug)]
pub struct PruneOperation {
    policy: TipPolicy,
    dry_run: bool,
    verbosity: Verbosity,
    deleted: Vec<BranchName>,
}

impl PruneOperation {
    pub fn new(policy: TipPolicy, dry_run: bool, verbosity: Verbosity) -> Self {
        Self {
            policy,
            dry_run,
            verbosity,
            deleted: Vec::new(),
        }
    }

    /// Branches deleted (or, in a dry run, that would be deleted) so far.
    pub fn deleted(&self) -> &[BranchName] {
        &self.deleted
    }
}

impl RepoOperation for PruneOperation {
    fn name(&self) -> &str {
        "prune"
    }

    fn process(&mut self, git: &Git, path: &Path) -> Result<()> {
        let heads = git.list_heads().context("Failed to list branches")?;
        let current = git.current_branch()?;
        let sets = ancestor_sets(git, &heads).context("Failed to classify branches")?;

        if let Some(head) = heads.iter().find(|h| current.as_ref() == Some(&h.name)) {
            if !is_tip(head, &sets, self.policy) {
                tracing::info!(path = %path.display(), branch = %head.name, "keeping checked-out branch");
            }
        }

        let doomed = removable(&heads, &sets, self.policy, current.as_ref());
        if !doomed.is_empty() {
            output::print(output::repo_header(path), self.verbosity);
        }

        for head in doomed {
            let name = &head.name;
            if self.dry_run {
                output::print(
                    format!("  would delete {} ({})", name, head.oid.short(7)),
                    self.verbosity,
                );
            } else {
                git.delete_branch(name, &head.oid)
                    .with_context(|| format!("Failed to delete branch {}", name))?;
                tracing::debug!(path = %path.display(), branch = %name, "deleted branch");
                output::print(
                    format!("  deleted {} ({})", name, head.oid.short(7)),
                    self.verbosity,
                );
            }
            self.deleted.push(head.name);
        }

        Ok(())
    }
}

/// Delete every non-tip branch in every repository under `path`.
pub fn prune(ctx: &Context, path: &Path, policy: TipPolicy, dry_run: bool) -> Result<()> {
    let mut op = PruneOperation::new(policy, dry_run, ctx.verbosity());
    run_walk(ctx, path, &mut op);

    let count = op.deleted().len();
    let verb = if dry_run { "would delete" } else { "deleted" };
    output::note(
        format!("{} {} branch{}", verb, count, if count == 1 { "" } else { "es" }),
        ctx.verbosity(),
    );
    Ok(())
}
