use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Logs go to stderr so stdout stays pure JSON.
///
/// An unparsable `directives` string falls back to `warn`.
pub fn init_tracing(directives: &str) {
    let env_filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    // Already installed: keep the existing subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}
