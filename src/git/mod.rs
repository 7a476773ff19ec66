//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2` or spawns the `git` executable.
//!
//! Local reads, CAS ref deletion and config writes use `git2`. Operations
//! that need transports or a full checkout (fetch, clone, checkout) run the
//! `git` executable with the repository as its working directory, so they
//! honor the user's credential helpers and SSH setup.
//!
//! # Responsibilities
//!
//! - Exact (non-discovering) repository opening and bare detection
//! - Branch listing and CAS branch deletion
//! - Commit parent and ancestry queries
//! - Status and state detection
//! - Remote URL and local config access
//!
//! # Invariants
//!
//! - Branch deletion uses CAS (compare-and-swap) semantics
//! - The process working directory is never changed
//! - All operations return strong types (Oid, BranchName, RefName)

mod interface;

pub use interface::{Git, GitError, GitState, Probe, WorktreeStatus};
