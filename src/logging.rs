//! Tracing setup for the binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when nothing else is configured.
pub const DEFAULT_FILTER: &str = "warn,ngtools=info";

/// Pick the filter: explicit directive, then `NGTOOLS_LOG`, then `RUST_LOG`.
pub fn filter(explicit: Option<&str>) -> EnvFilter {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(crate::config::ENV_LOG).ok())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, writing to stderr so stdout stays clean
/// for printed state. Later calls are no-ops.
pub fn init(explicit: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(filter(explicit))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
