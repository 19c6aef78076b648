//! Configuration
//!
//! Environment-based configuration for the recorder: storage connection
//! parameters, the feed endpoint, the symbol list, and stream settings.

mod settings;

pub use settings::{
    ConfigError, DatabaseSettings, RecorderConfig, StreamSettings, DEFAULT_SYMBOLS,
};
