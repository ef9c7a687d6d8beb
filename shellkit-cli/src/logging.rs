//! Stderr logging for the CLI binaries.
//!
//! `shellkit_core` logs through the `log` facade; the fmt subscriber's
//! `tracing-log` bridge picks those records up.

use tracing_subscriber::EnvFilter;

/// Install the subscriber.  `verbose` forces `debug`, otherwise `RUST_LOG`
/// applies with a `warn` fallback.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
