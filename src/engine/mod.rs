//! engine
//!
//! Drives per-repository operations across a directory tree.
//!
//! # Architecture
//!
//! ```text
//! RepoWalker -> [candidate] -> Git::probe -> RepoOperation::process -> Outcome
//! ```
//!
//! - [`walker`] enumerates candidate directories and dispatches operations
//! - [`report`] holds per-candidate outcomes and the aggregated report
//!
//! # Invariants
//!
//! - A failure in one repository never stops the walk
//! - The process working directory is never changed
//! - A completed walk exits with status 0

pub mod report;
pub mod walker;

pub use report::{CandidateReport, Outcome, SkipReason, WalkReport};
pub use walker::{RepoOperation, RepoWalker};

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Output verbosity for these flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}
