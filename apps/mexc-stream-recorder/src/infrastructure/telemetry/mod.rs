//! Tracing Initialization
//!
//! Configures the tracing subscriber for the recorder. All operational
//! visibility is structured tracing events; set `RUST_LOG` to adjust levels.
//!
//! # Usage
//!
//! ```ignore
//! use mexc_stream_recorder::telemetry;
//!
//! // Initialize once at startup.
//! telemetry::init();
//!
//! tracing::info!(symbol = "BTC_USDT", "recording");
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the tracing subscriber.
///
/// Noisy transport internals are kept at `warn` unless `RUST_LOG`
/// overrides them.
#[allow(clippy::expect_used)]
pub fn init() {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(
            "mexc_stream_recorder=info"
                .parse()
                .expect("static directive 'mexc_stream_recorder=info' is valid"),
        )
        .add_directive(
            "tungstenite=warn"
                .parse()
                .expect("static directive 'tungstenite=warn' is valid"),
        )
        .add_directive(
            "sqlx=warn"
                .parse()
                .expect("static directive 'sqlx=warn' is valid"),
        );

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
