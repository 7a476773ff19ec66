//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Results go to stdout and respect the quiet flag. Warnings, errors and
//! per-repository failure reports go to stderr. When `--json` is enabled,
//! commands print machine-readable JSON instead.

use std::fmt::Display;
use std::path::Path;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. Quiet wins over debug.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a status note to stderr (respects quiet mode).
///
/// Used for summaries, so stdout carries only command results.
pub fn note(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("{}", message);
    }
}

/// Print a per-repository failure report (always shown).
pub fn failure(report: impl Display) {
    eprintln!("{}", report);
}

/// Header line introducing one repository's output.
pub fn repo_header(path: &Path) -> String {
    format!("{}:", path.display())
}
