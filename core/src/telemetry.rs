// Logging setup
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber.
///
/// Filter comes from `RUST_LOG`, falling back to `default_filter`
/// (e.g. `"info,heimdall_core=debug"`). Returns false if a subscriber was
/// already installed, which happens when tests or embedding binaries set up
/// their own.
pub fn init_logging(default_filter: &str) -> bool {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}
