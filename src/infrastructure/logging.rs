//! Logging initialization
//!
//! Console logging through tracing-subscriber with an environment-driven
//! filter. Embedding applications that install their own subscriber can skip
//! this entirely; `init_logging` is a no-op when a global subscriber exists.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize console logging with the default `info` level.
pub fn init_logging() {
    init_logging_with_filter("info");
}

/// Initialize console logging; `RUST_LOG` overrides `default_filter`.
pub fn init_logging_with_filter(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // try_init: keep whatever subscriber the embedder already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
