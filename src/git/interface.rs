//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to git for gitfleet. Local reads,
//! ref deletion and config writes go through libgit2; network transfer
//! (fetch, clone) and working-copy checkout run the `git` executable with an
//! explicit working directory. The process working directory is never
//! changed.
//!
//! # Opening
//!
//! [`Git::open`] and [`Git::probe`] open *exactly* the given directory. They
//! never search parent directories, so a subdirectory of a working tree is
//! reported as [`GitError::NotARepo`]. This is what lets the walker treat
//! every directory as an independent candidate.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: The path holds no repository
//! - [`GitError::BareRepo`]: The repository has no working directory
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::CasFailed`]: Compare-and-swap precondition failed
//! - [`GitError::OperationInProgress`]: Rebase/merge/cherry-pick in progress
//! - [`GitError::DirtyWorktree`]: Working tree has uncommitted changes
//! - [`GitError::CommandFailed`]: The `git` executable exited unsuccessfully
//!
//! # Example
//!
//! ```ignore
//! use gitfleet::git::{Git, Probe};
//! use std::path::Path;
//!
//! match Git::probe(Path::new("./some/dir"))? {
//!     Probe::Repo(git) => println!("{} heads", git.list_heads()?.len()),
//!     Probe::Bare => println!("bare repository"),
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::core::tips::{CommitGraph, Head};
use crate::core::types::{BranchName, Oid, RefName, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The path holds no git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported: {path}")]
    BareRepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Compare-and-swap precondition failed.
    ///
    /// The ref moved between the moment it was read and the moment it was
    /// deleted, e.g. a commit landed on a branch while `prune` was running.
    #[error("CAS failed for {refname}: expected {expected}, found {actual}")]
    CasFailed {
        /// The ref being updated
        refname: String,
        /// The expected old value
        expected: String,
        /// The actual current value
        actual: String,
    },

    /// Git operation in progress (rebase, merge, etc.).
    #[error("{operation} in progress")]
    OperationInProgress {
        /// The type of operation in progress
        operation: GitState,
    },

    /// Working tree has uncommitted changes.
    #[error("working tree is dirty: {details}")]
    DirtyWorktree {
        /// Description of what's dirty
        details: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Remote does not exist.
    #[error("remote not found: {name}")]
    RemoteNotFound {
        /// The remote name
        name: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// The `git` executable failed or could not be started.
    #[error("`git {command}` failed: {message}")]
    CommandFailed {
        /// The arguments passed to git
        command: String,
        /// Captured stderr, or the spawn error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context.contains("ref") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    /// Wrap an error that carries no useful code.
    fn internal(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: err.message().to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: err.message().to_string(),
            },
            _ => GitError::internal(err),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) => GitError::InvalidRefName { message: msg },
            TypeError::InvalidBranchName(msg) => GitError::InvalidRefName { message: msg },
        }
    }
}

/// Result of probing a directory that holds a repository.
#[derive(Debug)]
pub enum Probe {
    /// A repository with a working copy.
    Repo(Git),
    /// A bare repository.
    Bare,
}

/// State of in-progress Git operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitState {
    /// No operation in progress.
    Clean,
    /// Rebase in progress.
    Rebase,
    /// Merge in progress.
    Merge,
    /// Cherry-pick in progress.
    CherryPick,
    /// Revert in progress.
    Revert,
    /// Bisect in progress.
    Bisect,
    /// Apply mailbox in progress.
    ApplyMailbox,
}

impl GitState {
    /// Check if any operation is in progress.
    ///
    /// # Example
    ///
    /// ```
    /// use gitfleet::git::GitState;
    ///
    /// assert!(!GitState::Clean.is_in_progress());
    /// assert!(GitState::Merge.is_in_progress());
    /// ```
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, GitState::Clean)
    }

    /// Get a human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            GitState::Clean => "clean",
            GitState::Rebase => "rebase",
            GitState::Merge => "merge",
            GitState::CherryPick => "cherry-pick",
            GitState::Revert => "revert",
            GitState::Bisect => "bisect",
            GitState::ApplyMailbox => "apply-mailbox",
        }
    }
}

impl std::fmt::Display for GitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// Check if the worktree is clean (untracked files do not count).
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && !self.has_conflicts
    }

    /// Human-readable summary, e.g. "2 staged, 1 unstaged".
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.staged > 0 {
            parts.push(format!("{} staged", self.staged));
        }
        if self.unstaged > 0 {
            parts.push(format!("{} unstaged", self.unstaged));
        }
        if self.has_conflicts {
            parts.push("conflicts".to_string());
        }
        if parts.is_empty() {
            "clean".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// The Git interface.
///
/// One `Git` is bound to one working copy. It is created per visited
/// directory and dropped once that directory's operation returns.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
    /// Working directory root, without trailing separator
    work_dir: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("work_dir", &self.work_dir)
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Probe a directory: open it as a repository without searching parents.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if the directory holds no repository
    /// - [`GitError::AccessError`] for anything else (permissions, corruption)
    pub fn probe(path: &Path) -> Result<Probe, GitError> {
        let repo = git2::Repository::open(path).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound => GitError::NotARepo {
                path: path.to_path_buf(),
            },
            _ => GitError::AccessError {
                message: format!("{}: {}", path.display(), e.message()),
            },
        })?;

        if repo.is_bare() {
            return Ok(Probe::Bare);
        }

        let work_dir = match repo.workdir() {
            Some(dir) => dir.components().collect(),
            None => return Ok(Probe::Bare),
        };

        Ok(Probe::Repo(Self { repo, work_dir }))
    }

    /// Open a repository with a working copy at exactly `path`.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if the directory holds no repository
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        match Self::probe(path)? {
            Probe::Repo(git) => Ok(git),
            Probe::Bare => Err(GitError::BareRepo {
                path: path.to_path_buf(),
            }),
        }
    }

    /// The working directory root.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    // =========================================================================
    // State Detection
    // =========================================================================

    /// Get the current Git state (rebase, merge, etc.).
    pub fn state(&self) -> GitState {
        match self.repo.state() {
            git2::RepositoryState::Clean => GitState::Clean,
            git2::RepositoryState::Rebase
            | git2::RepositoryState::RebaseInteractive
            | git2::RepositoryState::RebaseMerge => GitState::Rebase,
            git2::RepositoryState::Merge => GitState::Merge,
            git2::RepositoryState::CherryPick | git2::RepositoryState::CherryPickSequence => {
                GitState::CherryPick
            }
            git2::RepositoryState::Revert | git2::RepositoryState::RevertSequence => {
                GitState::Revert
            }
            git2::RepositoryState::Bisect => GitState::Bisect,
            git2::RepositoryState::ApplyMailbox | git2::RepositoryState::ApplyMailboxOrRebase => {
                GitState::ApplyMailbox
            }
        }
    }

    /// Get working tree status summary, ignoring untracked files.
    pub fn worktree_status(&self) -> Result<WorktreeStatus, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(GitError::internal)?;

        let mut result = WorktreeStatus::default();
        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result.has_conflicts = true;
            }
            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }
            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }
        }

        Ok(result)
    }

    // =========================================================================
    // Ref Resolution
    // =========================================================================

    /// Resolve a ref to the commit it points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the ref doesn't exist
    pub fn resolve_ref(&self, refname: &str) -> Result<Oid, GitError> {
        let reference = self
            .repo
            .find_reference(refname)
            .map_err(|e| GitError::from_git2(e, refname))?;

        let oid = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, refname))?
            .id();

        Ok(Oid::new(oid.to_string())?)
    }

    /// Get HEAD commit OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn (new repository)
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        self.resolve_ref("HEAD")
    }

    /// Check if a ref exists.
    pub fn ref_exists(&self, refname: &str) -> bool {
        self.repo.find_reference(refname).is_ok()
    }

    /// Get the current branch name, if on a branch.
    ///
    /// Returns `None` if HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(Some(BranchName::new(name)?));
            }
        }

        Ok(None)
    }

    // =========================================================================
    // Branches
    // =========================================================================

    /// List all local branches with the commit each points at.
    ///
    /// Branches whose names are not valid refnames are skipped. A branch
    /// whose commit cannot be read is an error.
    pub fn list_heads(&self) -> Result<Vec<Head>, GitError> {
        let branches = self
            .repo
            .branches(Some(git2::BranchType::Local))
            .map_err(GitError::internal)?;

        let mut heads = Vec::new();
        for branch in branches {
            let (branch, _) = branch.map_err(GitError::internal)?;
            let name = match branch.name().ok().flatten().map(BranchName::new) {
                Some(Ok(name)) => name,
                _ => continue,
            };
            let commit = branch
                .get()
                .peel_to_commit()
                .map_err(|e| GitError::from_git2(e, name.as_str()))?;
            heads.push(Head::new(name, Oid::new(commit.id().to_string())?));
        }

        heads.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(heads)
    }

    /// Check whether a local branch exists.
    pub fn branch_exists(&self, branch: &BranchName) -> bool {
        self.ref_exists(RefName::for_branch(branch).as_str())
    }

    /// Find a remote that has a remote-tracking branch named `branch`.
    ///
    /// `origin` is preferred when several remotes carry the branch.
    pub fn find_remote_tracking_branch(
        &self,
        branch: &BranchName,
    ) -> Result<Option<String>, GitError> {
        let mut remotes = self.remote_names()?;
        remotes.sort_by_key(|name| name != "origin");

        for remote in remotes {
            let refname = match RefName::for_remote_branch(&remote, branch) {
                Ok(r) => r,
                Err(_) => continue,
            };
            if self.ref_exists(refname.as_str()) {
                return Ok(Some(remote));
            }
        }

        Ok(None)
    }

    /// Delete a ref with compare-and-swap semantics.
    ///
    /// The delete only succeeds if the ref's current value matches `expected_old`.
    ///
    /// # Errors
    ///
    /// - [`GitError::CasFailed`] if the current value doesn't match expected
    /// - [`GitError::RefNotFound`] if the ref doesn't exist
    pub fn delete_ref_cas(&self, refname: &RefName, expected_old: &Oid) -> Result<(), GitError> {
        let mut reference = match self.repo.find_reference(refname.as_str()) {
            Ok(r) => r,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                return Err(GitError::RefNotFound {
                    refname: refname.to_string(),
                })
            }
            Err(e) => return Err(GitError::from_git2(e, refname.as_str())),
        };

        let actual = reference
            .target()
            .map(|oid| oid.to_string())
            .unwrap_or_else(|| "<symbolic>".to_string());
        if actual != expected_old.as_str() {
            return Err(GitError::CasFailed {
                refname: refname.to_string(),
                expected: expected_old.to_string(),
                actual,
            });
        }

        reference
            .delete()
            .map_err(|e| GitError::from_git2(e, refname.as_str()))
    }

    /// Delete a local branch, provided it still points at `expected`.
    pub fn delete_branch(&self, branch: &BranchName, expected: &Oid) -> Result<(), GitError> {
        self.delete_ref_cas(&RefName::for_branch(branch), expected)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Get the parent OIDs of a commit.
    ///
    /// Returns empty vec for root commits, multiple OIDs for merge commits.
    pub fn commit_parents(&self, oid: &Oid) -> Result<Vec<Oid>, GitError> {
        let commit = self.find_commit(oid)?;

        commit
            .parent_ids()
            .map(|id| Oid::new(id.to_string()).map_err(GitError::from))
            .collect()
    }

    fn git2_oid(oid: &Oid) -> Result<git2::Oid, GitError> {
        git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
    }

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .find_commit(Self::git2_oid(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }

    // =========================================================================
    // Remotes
    // =========================================================================

    /// Names of all configured remotes.
    pub fn remote_names(&self) -> Result<Vec<String>, GitError> {
        let remotes = self.repo.remotes().map_err(GitError::internal)?;
        Ok(remotes.iter().flatten().map(String::from).collect())
    }

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::internal(e)),
        }
    }

    /// Set the fetch URL of an existing remote.
    ///
    /// # Errors
    ///
    /// - [`GitError::RemoteNotFound`] if the remote doesn't exist
    pub fn set_remote_url(&self, name: &str, url: &str) -> Result<(), GitError> {
        if !self.remote_names()?.iter().any(|r| r == name) {
            return Err(GitError::RemoteNotFound {
                name: name.to_string(),
            });
        }
        self.repo
            .remote_set_url(name, url)
            .map_err(GitError::internal)
    }

    // =========================================================================
    // Config
    // =========================================================================

    /// Read a value from the repository-local config (`.git/config`).
    pub fn config_string(&self, key: &str) -> Result<Option<String>, GitError> {
        let config = self.local_config()?;
        match config.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::internal(e)),
        }
    }

    /// Write a value into the repository-local config (`.git/config`).
    pub fn set_config_string(&self, key: &str, value: &str) -> Result<(), GitError> {
        self.local_config()?
            .set_str(key, value)
            .map_err(GitError::internal)
    }

    fn local_config(&self) -> Result<git2::Config, GitError> {
        self.repo
            .config()
            .and_then(|c| c.open_level(git2::ConfigLevel::Local))
            .map_err(GitError::internal)
    }

    // =========================================================================
    // git executable
    // =========================================================================

    /// Fetch all remotes.
    pub fn fetch_all(&self, prune: bool) -> Result<(), GitError> {
        let mut args = vec!["fetch", "--all", "--quiet"];
        if prune {
            args.push("--prune");
        }
        run_git(Some(&self.work_dir), &args).map(|_| ())
    }

    /// Check out an existing local branch.
    pub fn checkout(&self, branch: &BranchName) -> Result<(), GitError> {
        run_git(Some(&self.work_dir), &["checkout", "--quiet", branch.as_str()]).map(|_| ())
    }

    /// Create a local branch tracking `<remote>/<branch>` and check it out.
    pub fn checkout_tracking(&self, branch: &BranchName, remote: &str) -> Result<(), GitError> {
        let upstream = format!("{}/{}", remote, branch);
        run_git(
            Some(&self.work_dir),
            &["checkout", "--quiet", "--track", "-b", branch.as_str(), &upstream],
        )
        .map(|_| ())
    }

    /// Clone `url` into `dest`. `dest` must not exist yet.
    pub fn clone_into(url: &str, dest: &Path) -> Result<(), GitError> {
        let dest = dest.to_string_lossy();
        run_git(None, &["clone", "--quiet", "--", url, &dest]).map(|_| ())
    }
}

impl CommitGraph for Git {
    fn commit_parents(&self, oid: &Oid) -> Result<Vec<Oid>, GitError> {
        Git::commit_parents(self, oid)
    }

    fn ancestors(&self, oid: &Oid) -> Result<HashSet<Oid>, GitError> {
        let start = self.find_commit(oid)?.id();

        let mut revwalk = self.repo.revwalk().map_err(GitError::internal)?;
        revwalk.push(start).map_err(GitError::internal)?;

        let mut seen = HashSet::new();
        for id in revwalk {
            let id = id.map_err(|e| GitError::from_git2(e, oid.as_str()))?;
            seen.insert(Oid::new(id.to_string())?);
        }

        Ok(seen)
    }
}

/// Run the git executable, returning stdout.
///
/// Prompts are disabled: a batch run must never block on a credential
/// prompt for one repository.
fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<String, GitError> {
    let mut command = Command::new("git");
    command.args(args).env("GIT_TERMINAL_PROMPT", "0");
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    tracing::debug!(?dir, args = %args.join(" "), "running git");

    let output = command.output().map_err(|e| GitError::CommandFailed {
        command: args.join(" "),
        message: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command: args.join(" "),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
