//! Tracing Setup

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
///
/// Honors `RUST_LOG`, with `info` always enabled. Calling it again after a
/// subscriber is installed is a no-op.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(development = super::is_development(), "Tracing initialized");
    }
}
