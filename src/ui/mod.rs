//! ui
//!
//! User-facing output and diagnostic logging.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Design
//!
//! Command results are printed through [`output`]; internal diagnostics are
//! `tracing` events filtered by [`logging`].

pub mod logging;
pub mod output;
