//! Tracing setup for the command-line tools

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// Logs go to stderr so they never interleave with the report on stdout.
/// `RUST_LOG` wins over `default_filter`.
pub fn init(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
