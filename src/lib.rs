//! gitfleet - batch operations over a tree of git working copies
//!
//! gitfleet walks a directory tree, opens every directory that is the root of
//! a non-bare git repository, and runs one operation on each: list or prune
//! subsumed branches, fetch, check out a branch, set the author identity,
//! rewrite remote URLs. It can also populate a tree by cloning every project
//! visible on a GitLab server.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, builds operations)
//! - [`engine`] - Repository walker and per-repository outcomes
//! - [`core`] - Domain types, tip classification, configuration
//! - [`git`] - Single interface for all Git operations
//! - [`forge`] - Project listing on hosting services (GitLab)
//! - [`ui`] - Output and logging
//!
//! # Invariants
//!
//! 1. A failure in one repository never stops the walk
//! 2. The process working directory is never changed
//! 3. Branch deletion is compare-and-swap against the classified commit

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod git;
pub mod ui;
