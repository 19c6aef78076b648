//! Reconnection Policy
//!
//! Exponential backoff with jitter for stream reconnection. Reconnection is
//! a configurable policy: the `enabled` switch turns it off entirely, which
//! makes a dropped connection terminal for its task.

use std::time::Duration;

use rand::Rng;

/// Configuration for reconnection behavior.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Whether to reconnect at all after a drop.
    pub enabled: bool,
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Cap on the delay between attempts.
    pub max_delay: Duration,
    /// Backoff multiplier applied per attempt.
    pub multiplier: f64,
    /// Jitter as a fraction of the computed delay (0.1 = ±10%).
    pub jitter_factor: f64,
    /// Maximum number of attempts (0 = unlimited).
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(64),
            multiplier: 2.0,
            jitter_factor: 0.1,
            max_attempts: 0,
        }
    }
}

/// Backoff state for one connection's reconnection attempts.
///
/// The delay for attempt `n` (zero-based) is
/// `initial_delay * multiplier^n`, capped at `max_delay`, with jitter
/// applied last. `reset` is called after a successful subscription so a
/// long-lived connection starts its next outage from the initial delay.
#[derive(Debug)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    attempts: u32,
}

impl ReconnectPolicy {
    /// Create a policy from its configuration.
    #[must_use]
    pub const fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    /// Delay before the next attempt, or `None` when reconnection is
    /// disabled or the attempt budget is exhausted.
    #[must_use]
    pub fn next_delay(&mut self) -> Option<Duration> {
        if !self.config.enabled {
            return None;
        }
        if self.config.max_attempts > 0 && self.attempts >= self.config.max_attempts {
            return None;
        }

        // Cap the exponent so the pow cannot blow up long before the
        // max_delay cap applies.
        let exponent = self.attempts.min(31);
        self.attempts += 1;

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
        let raw = self.config.initial_delay.as_millis() as f64
            * self.config.multiplier.powi(exponent as i32);
        #[allow(clippy::cast_precision_loss)]
        let capped = raw.min(self.config.max_delay.as_millis() as f64);

        Some(self.apply_jitter(capped))
    }

    /// Reset after a successful connection.
    pub const fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Attempts made since the last reset.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempts
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn apply_jitter(&self, millis: f64) -> Duration {
        if self.config.jitter_factor <= 0.0 {
            return Duration::from_millis(millis as u64);
        }

        let spread = millis * self.config.jitter_factor;
        let offset: f64 = rand::rng().random_range(-spread..=spread);
        Duration::from_millis((millis + offset).max(1.0) as u64)
    }
}
