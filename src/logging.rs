//! Tracing setup

use crate::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for the configured level
///
/// `RUST_LOG` wins when set.
pub fn filter_directive(config: &LoggingConfig) -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| format!("energylog={}", config.level))
}

/// Install the global subscriber
///
/// `format = "json"` emits one JSON object per line, anything else the
/// human-readable pretty format. Fails if a subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_new(filter_directive(config))
        .unwrap_or_else(|_| EnvFilter::new("energylog=info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    }
}
