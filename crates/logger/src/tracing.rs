use std::env::var;
use std::io;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging at `info`, overridable through `RUST_LOG`.
pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// Initialize logging with `level` as the default directive.
///
/// Output goes to stderr so stdout stays free for probe results. Setting
/// `RUST_LOG_FORMAT=json` switches to one JSON object per event. Calling
/// this twice is harmless; the second call keeps the first subscriber.
pub fn init_with_level(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT").unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_filter(env_filter)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_writer(io::stderr)
            .with_filter(env_filter)
            .boxed(),
    };

    if let Err(error) = tracing_subscriber::registry().with(log_layer).try_init() {
        warn!("Logging was already initialized: {error}");
    }
}
