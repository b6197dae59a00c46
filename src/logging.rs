//! Logging prelude: tracing macro re-exports and subscriber setup.
//!
//! Modules do `use crate::logging::*;` and get the usual tracing macros.
//!
//! The log level defaults to INFO (DEBUG with `--verbose`) and can always be
//! overridden through `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=keepr=trace keepr backup
//! RUST_LOG=keepr::engine=debug keepr backup
//! ```

pub use tracing::{debug, error, info, warn};

/// Initialize the tracing subscriber. Logs go to stderr so command output
/// stays clean on stdout.
pub fn init_tracing(verbose: bool) {
	let default_level = if verbose { "debug" } else { "info" };
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
		)
		.with_writer(std::io::stderr)
		.init();
}

// vim: ts=4
