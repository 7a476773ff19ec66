//! engine::walker
//!
//! Repository walker: evaluates the start directory and every directory below
//! it as a candidate repository root and dispatches a [`RepoOperation`] on each
//! one that opens as a non-bare repository.
//!
//! # Traversal
//!
//! - Depth-first, entries sorted by file name at each level.
//! - Directories named `.git` are neither evaluated nor descended into. The
//!   start path is always evaluated, whatever its name.
//! - Symbolic links to directories are evaluated but not followed.
//! - Repositories are walked into, so nested repositories and submodule
//!   checkouts are visited too.
//!
//! # Failure isolation
//!
//! Each candidate yields an [`Outcome`]. A directory that holds no repository
//! and a bare repository are skips; every other error (opening, listing a
//! directory, or returned by the operation) becomes [`Outcome::Failed`] and
//! the walk continues. Panics are not caught.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use walkdir::{DirEntry, WalkDir};

use super::report::{CandidateReport, Outcome, SkipReason, WalkReport};
use crate::git::{Git, GitError, Probe};

/// Work applied to each repository found by the walker.
pub trait RepoOperation {
    /// Name used in log events.
    fn name(&self) -> &str;

    /// Run against one repository.
    ///
    /// `path` is the absolute candidate path the repository was opened from.
    fn process(&mut self, git: &Git, path: &Path) -> anyhow::Result<()>;
}

/// Walks a directory tree looking for repositories.
#[derive(Debug, Clone)]
pub struct RepoWalker {
    start: PathBuf,
}

impl RepoWalker {
    /// Bind a walker to `start`, made absolute against the current directory.
    pub fn new(start: impl AsRef<Path>) -> Self {
        let start = start.as_ref();
        let absolute = std::path::absolute(start).unwrap_or_else(|_| start.to_path_buf());
        Self {
            start: absolute.components().collect(),
        }
    }

    /// The absolute start path.
    pub fn start(&self) -> &Path {
        &self.start
    }

    /// Walk the tree, running `op` on every repository found.
    pub fn run<O>(&self, op: &mut O) -> WalkReport
    where
        O: RepoOperation + ?Sized,
    {
        self.run_with(op, |_| {})
    }

    /// Walk the tree, calling `on_outcome` for each candidate as soon as its
    /// outcome is known.
    pub fn run_with<O, F>(&self, op: &mut O, mut on_outcome: F) -> WalkReport
    where
        O: RepoOperation + ?Sized,
        F: FnMut(&CandidateReport),
    {
        tracing::debug!(start = %self.start.display(), operation = op.name(), "starting walk");

        let mut report = WalkReport::new();
        let entries = WalkDir::new(&self.start)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");

        for entry in entries {
            let candidate = match entry {
                Ok(entry) => {
                    if !is_candidate(&entry) {
                        continue;
                    }
                    let outcome = evaluate(op, entry.path());
                    CandidateReport::new(entry.into_path(), outcome)
                }
                Err(err) => {
                    let path = err.path().unwrap_or(&self.start).to_path_buf();
                    tracing::warn!(path = %path.display(), error = %err, "failed to read directory");
                    let err = anyhow::Error::new(err)
                        .context(format!("failed to read directory {}", path.display()));
                    CandidateReport::new(path, Outcome::Failed(err))
                }
            };

            on_outcome(&candidate);
            report.push(candidate);
        }

        tracing::info!(
            operation = op.name(),
            processed = report.processed(),
            failed = report.failed(),
            "walk finished"
        );
        report
    }
}

/// Directories, and symbolic links that resolve to directories.
fn is_candidate(entry: &DirEntry) -> bool {
    if entry.file_type().is_dir() {
        return true;
    }
    entry.path_is_symlink()
        && fs::metadata(entry.path())
            .map(|m| m.is_dir())
            .unwrap_or(false)
}

/// Open one candidate and run the operation on it.
fn evaluate<O>(op: &mut O, path: &Path) -> Outcome
where
    O: RepoOperation + ?Sized,
{
    let git = match Git::probe(path) {
        Ok(Probe::Repo(git)) => git,
        Ok(Probe::Bare) => {
            tracing::debug!(path = %path.display(), "skipping bare repository");
            return Outcome::Skipped(SkipReason::Bare);
        }
        Err(GitError::NotARepo { .. }) => {
            tracing::trace!(path = %path.display(), "not a repository");
            return Outcome::Skipped(SkipReason::NotARepository);
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to open repository");
            return Outcome::Failed(
                anyhow::Error::new(err).context(format!("failed to open {}", path.display())),
            );
        }
    };

    tracing::debug!(path = %path.display(), operation = op.name(), "processing repository");

    match op
        .process(&git, path)
        .with_context(|| format!("{} failed", op.name()))
    {
        Ok(()) => Outcome::Processed,
        Err(err) => {
            tracing::warn!(path = %path.display(), operation = op.name(), error = %err, "operation failed");
            Outcome::Failed(err)
        }
    }
}
