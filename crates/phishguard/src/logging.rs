//! Logging initialization for host binaries.
//!
//! Library code logs through the `log` macros; this installs a `tracing`
//! subscriber with a `tracing-log` bridge so those records are captured.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global tracing subscriber.
///
/// Reads the filter from `RUST_LOG`, defaulting to `info`. Safe to call
/// more than once; subsequent calls are no-ops.
pub fn init_logging() {
    // Bridge `log` records into `tracing`.
    let _ = tracing_log::LogTracer::init();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
