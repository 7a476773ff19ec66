//! engine::report
//!
//! Per-candidate outcomes and the aggregated walk report.
//!
//! A failure in one repository is an [`Outcome::Failed`] value, not an
//! unwinding error: the walker records it and moves on to the next
//! candidate.

use std::fmt;
use std::path::{Path, PathBuf};

/// Why a candidate was skipped without running the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The directory holds no repository.
    NotARepository,
    /// The repository has no working copy.
    Bare,
    /// The destination already exists (clone).
    AlreadyExists,
}

impl SkipReason {
    /// Short description for summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotARepository => "not a repository",
            SkipReason::Bare => "bare repository",
            SkipReason::AlreadyExists => "already exists",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one candidate.
#[derive(Debug)]
pub enum Outcome {
    /// The operation ran and returned `Ok`.
    Processed,
    /// The operation did not run.
    Skipped(SkipReason),
    /// Opening the repository, listing the directory, or the operation failed.
    Failed(anyhow::Error),
}

impl Outcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, Outcome::Processed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// The skip reason, if skipped.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Outcome::Skipped(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Outcome for a single candidate path.
#[derive(Debug)]
pub struct CandidateReport {
    /// Absolute path of the candidate
    pub path: PathBuf,
    /// What happened
    pub outcome: Outcome,
}

impl CandidateReport {
    pub fn new(path: impl Into<PathBuf>, outcome: Outcome) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }

    /// Full failure report: the path, the error chain and, when captured,
    /// the backtrace.
    ///
    /// Returns `None` unless the candidate failed.
    pub fn failure_report(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Failed(err) => Some(format!(
                "Error while processing {}:\n{:?}",
                self.path.display(),
                err
            )),
            _ => None,
        }
    }
}

/// Outcomes of one traversal.
///
/// Repositories and failures are kept in traversal order. Directories that
/// hold no repository are only counted.
#[derive(Debug, Default)]
pub struct WalkReport {
    candidates: Vec<CandidateReport>,
    not_a_repository: usize,
}

impl WalkReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a candidate outcome.
    pub fn push(&mut self, report: CandidateReport) {
        if report.outcome.skip_reason() == Some(SkipReason::NotARepository) {
            self.not_a_repository += 1;
        } else {
            self.candidates.push(report);
        }
    }

    /// Recorded candidates, in traversal order. Directories that hold no
    /// repository are not included.
    pub fn candidates(&self) -> &[CandidateReport] {
        &self.candidates
    }

    /// Paths the operation ran on successfully, in traversal order.
    pub fn processed_paths(&self) -> Vec<&Path> {
        self.candidates
            .iter()
            .filter(|c| c.outcome.is_processed())
            .map(|c| c.path.as_path())
            .collect()
    }

    /// Failed candidates, in traversal order.
    pub fn failures(&self) -> impl Iterator<Item = &CandidateReport> {
        self.candidates.iter().filter(|c| c.outcome.is_failed())
    }

    pub fn processed(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.outcome.is_processed())
            .count()
    }

    /// Number of skipped candidates, optionally only those with `reason`.
    pub fn skipped(&self, reason: Option<SkipReason>) -> usize {
        let recorded = self
            .candidates
            .iter()
            .filter(|c| match (c.outcome.skip_reason(), reason) {
                (Some(_), None) => true,
                (Some(actual), Some(wanted)) => actual == wanted,
                (None, _) => false,
            })
            .count();

        match reason {
            None | Some(SkipReason::NotARepository) => recorded + self.not_a_repository,
            Some(_) => recorded,
        }
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// Process exit status for a completed traversal.
    ///
    /// Always `0`: per-repository failures are reported, not propagated.
    pub fn exit_code(&self) -> i32 {
        0
    }

    /// One-line summary, e.g. "3 repositories processed, 1 failed".
    ///
    /// Directories that hold no repository are not counted.
    pub fn summary(&self) -> String {
        let processed = self.processed();
        let mut parts = vec![format!(
            "{} {} processed",
            processed,
            if processed == 1 {
                "repository"
            } else {
                "repositories"
            }
        )];

        for reason in [SkipReason::Bare, SkipReason::AlreadyExists] {
            let count = self.skipped(Some(reason));
            if count > 0 {
                parts.push(format!("{} skipped ({})", count, reason));
            }
        }

        let failed = self.failed();
        if failed > 0 {
            parts.push(format!("{} failed", failed));
        }

        parts.join(", ")
    }
}
