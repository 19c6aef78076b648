//! MEXC Stream Recorder Binary
//!
//! Starts the deals recorder.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin mexc-stream-recorder
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL`: Postgres connection URL
//!
//! ## Optional
//! - `MEXC_WS_URL`: Feed endpoint (default: wss://wbs.mexc.com/ws)
//! - `MEXC_SYMBOLS`: Comma-separated symbol list (default: built-in list)
//! - `MEXC_RECONNECT_ENABLED`: Reconnect after drops (default: true)
//! - `MEXC_RECONNECT_DELAY_INITIAL_MS`: Initial backoff delay (default: 1000)
//! - `MEXC_RECONNECT_DELAY_MAX_SECS`: Backoff delay cap (default: 64)
//! - `MEXC_RECONNECT_MAX_ATTEMPTS`: Attempt budget, 0 = unlimited (default: 0)
//! - `RECORDER_CHANNEL_CAPACITY`: Per-symbol event channel bound (default: 1024)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use mexc_stream_recorder::application::services::{StreamSupervisor, SupervisorSettings};
use mexc_stream_recorder::{DealSink, PgDealStore, RecorderConfig, SymbolRegistry, telemetry};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    load_dotenv();

    telemetry::init();

    tracing::info!("Starting MEXC stream recorder");

    let config = RecorderConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let store = PgDealStore::connect(&config.database)
        .await
        .context("failed to connect to Postgres")?;
    store
        .init_schema()
        .await
        .context("failed to initialize market schema")?;

    let registry = SymbolRegistry::from_wire_list(config.symbols.iter().map(String::as_str));

    // Catalog rows must exist before the first deal row references them.
    for symbol in registry.iter() {
        store
            .upsert_symbol(&symbol.catalog_key())
            .await
            .with_context(|| format!("failed to register symbol {symbol}"))?;
    }
    tracing::info!(symbols = registry.len(), "symbol catalog registered");

    let sink: Arc<dyn DealSink> = Arc::new(store);
    let settings = SupervisorSettings {
        ws_url: config.stream.url.clone(),
        channel_capacity: config.stream.channel_capacity,
        reconnect: config.stream.reconnect_config(),
    };

    let supervisor =
        StreamSupervisor::spawn(&registry, sink, &settings, shutdown_token.clone());

    tracing::info!("stream recorder ready");

    await_shutdown(shutdown_token).await;

    supervisor.shutdown().await;

    tracing::info!("stream recorder stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &RecorderConfig) {
    tracing::info!(
        ws_url = %config.stream.url,
        symbols = ?config.symbols,
        reconnect_enabled = config.stream.reconnect_enabled,
        max_reconnect_attempts = config.stream.max_reconnect_attempts,
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!("Graceful shutdown started");
}
