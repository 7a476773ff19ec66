//! ui::logging
//!
//! `tracing` subscriber setup for the CLI.
//!
//! `RUST_LOG` wins when set. Otherwise `--debug` selects `gitfleet=debug`,
//! `--quiet` selects `gitfleet=error` and the default is `gitfleet=warn`.
//! Events are written to stderr so they never mix with command output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given flags.
pub fn default_directive(debug: bool, quiet: bool) -> &'static str {
    if quiet {
        "gitfleet=error"
    } else if debug {
        "gitfleet=debug"
    } else {
        "gitfleet=warn"
    }
}

/// Install the global subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(debug: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug, quiet)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives() {
        assert_eq!(default_directive(false, false), "gitfleet=warn");
        assert_eq!(default_directive(true, false), "gitfleet=debug");
        assert_eq!(default_directive(true, true), "gitfleet=error");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(false, false);
        init(true, false);
    }
}
