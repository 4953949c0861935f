use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;

/// Installs the global tracing subscriber. `RUST_LOG` overrides the
/// configured level; calling twice is a no-op so tests can initialise
/// freely.
pub fn init(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
