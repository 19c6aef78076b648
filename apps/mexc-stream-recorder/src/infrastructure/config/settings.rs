//! Recorder Configuration Settings
//!
//! Configuration types for the recorder, loaded from environment variables.

use std::time::Duration;

use crate::infrastructure::mexc::ReconnectConfig;

/// Default feed endpoint.
const DEFAULT_WS_URL: &str = "wss://wbs.mexc.com/ws";

/// Symbols recorded when `MEXC_SYMBOLS` is unset.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "BTC_USDT",
    "ETH_USDT",
    "SOL_USDT",
    "XRP_USDT",
    "ADA_USDT",
];

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable is set but empty.
    #[error("environment variable {0} must not be empty")]
    EmptyValue(String),
}

/// Storage connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Postgres connection URL.
    pub url: String,
    /// Pool size shared by all stream tasks.
    pub max_connections: u32,
}

/// Stream connection settings.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Feed endpoint URL.
    pub url: String,
    /// Whether dropped connections reconnect.
    pub reconnect_enabled: bool,
    /// Initial reconnection delay.
    pub reconnect_delay_initial: Duration,
    /// Maximum reconnection delay.
    pub reconnect_delay_max: Duration,
    /// Reconnection delay multiplier for exponential backoff.
    pub reconnect_delay_multiplier: f64,
    /// Maximum reconnection attempts before giving up (0 = unlimited).
    pub max_reconnect_attempts: u32,
    /// Bound of each per-symbol event channel.
    pub channel_capacity: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_WS_URL.to_string(),
            reconnect_enabled: true,
            reconnect_delay_initial: Duration::from_secs(1),
            reconnect_delay_max: Duration::from_secs(64),
            reconnect_delay_multiplier: 2.0,
            max_reconnect_attempts: 0,
            channel_capacity: 1024,
        }
    }
}

impl StreamSettings {
    /// Render the reconnection policy for these settings.
    #[must_use]
    pub const fn reconnect_config(&self) -> ReconnectConfig {
        ReconnectConfig {
            enabled: self.reconnect_enabled,
            initial_delay: self.reconnect_delay_initial,
            max_delay: self.reconnect_delay_max,
            multiplier: self.reconnect_delay_multiplier,
            jitter_factor: 0.1,
            max_attempts: self.max_reconnect_attempts,
        }
    }
}

/// Complete recorder configuration.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Storage connection settings.
    pub database: DatabaseSettings,
    /// Stream connection settings.
    pub stream: StreamSettings,
    /// Symbols to record, in wire form and registration order.
    pub symbols: Vec<String>,
}

impl RecorderConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        if database_url.is_empty() {
            return Err(ConfigError::EmptyValue("DATABASE_URL".to_string()));
        }

        let symbols = match std::env::var("MEXC_SYMBOLS") {
            Ok(raw) => {
                let parsed = parse_symbol_list(&raw);
                if parsed.is_empty() {
                    return Err(ConfigError::EmptyValue("MEXC_SYMBOLS".to_string()));
                }
                parsed
            }
            Err(_) => DEFAULT_SYMBOLS.iter().map(ToString::to_string).collect(),
        };

        let defaults = StreamSettings::default();
        let stream = StreamSettings {
            url: std::env::var("MEXC_WS_URL").unwrap_or_else(|_| defaults.url.clone()),
            reconnect_enabled: parse_env_bool("MEXC_RECONNECT_ENABLED", true),
            reconnect_delay_initial: parse_env_duration_ms(
                "MEXC_RECONNECT_DELAY_INITIAL_MS",
                defaults.reconnect_delay_initial,
            ),
            reconnect_delay_max: parse_env_duration_secs(
                "MEXC_RECONNECT_DELAY_MAX_SECS",
                defaults.reconnect_delay_max,
            ),
            reconnect_delay_multiplier: defaults.reconnect_delay_multiplier,
            max_reconnect_attempts: parse_env_u32("MEXC_RECONNECT_MAX_ATTEMPTS", 0),
            channel_capacity: parse_env_usize(
                "RECORDER_CHANNEL_CAPACITY",
                defaults.channel_capacity,
            ),
        };

        let database = DatabaseSettings {
            url: database_url,
            max_connections: parse_env_u32("DATABASE_MAX_CONNECTIONS", 5),
        };

        Ok(Self {
            database,
            stream,
            symbols,
        })
    }
}

/// Split a comma-separated symbol list, dropping empty entries.
fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(default)
}

fn parse_env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_ms(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map_or(default, Duration::from_millis)
}

fn parse_env_duration_secs(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map_or(default, Duration::from_secs)
}
