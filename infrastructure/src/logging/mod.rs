//! Logging infrastructure: tracing setup and structured engine event logging.
//!
//! Provides [`JsonlEventLogger`], a JSONL file writer that implements
//! the [`EventLogger`](conductor_application::EventLogger) port, and
//! [`init_tracing`] for diagnostic output.

mod jsonl_logger;

pub use jsonl_logger::JsonlEventLogger;

use tracing_subscriber::EnvFilter;

/// Map a verbosity count to a filter directive.
pub fn filter_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global fmt subscriber. `RUST_LOG` wins when set.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(verbose: u8) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
