//! cli
//!
//! Command-line interface layer for gitfleet.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the `tracing` subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to a
//! handler in [`commands`], which runs a per-repository operation through
//! the [`crate::engine`] walker.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::engine;
use crate::ui::logging;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    logging::init(cli.debug, cli.quiet);

    let ctx = engine::Context {
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
