//! Connection monitor configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// How the delay between staleness checks reacts to reconnection attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalPolicy {
    /// Compute the delay once, when the check loop is (re)started.
    ///
    /// Attempts made while the loop runs do not change its cadence; only a
    /// fresh `start()` picks up a new interval.
    #[default]
    Fixed,
    /// Recompute the delay after every check from the current attempt count.
    Adaptive,
}

/// Reconnection policy for a single supervised connection.
///
/// Immutable for the lifetime of the monitor built from it.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Whether the monitor may request reopens at all.
    ///
    /// When disabled the monitor still ticks but is purely observational.
    #[serde(default)]
    pub reconnection: bool,
    /// Reopen attempts allowed per run before the monitor goes quiet.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Lower bound on the delay between staleness checks (seconds).
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: u64,
    /// Upper bound on the delay between staleness checks (seconds).
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    #[serde(default)]
    pub interval_policy: IntervalPolicy,
}

const fn default_max_reconnect_attempts() -> u32 {
    30
}

const fn default_min_delay_secs() -> u64 {
    3
}

const fn default_max_delay_secs() -> u64 {
    30
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            reconnection: false,
            max_reconnect_attempts: default_max_reconnect_attempts(),
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
            interval_policy: IntervalPolicy::default(),
        }
    }
}

impl MonitorConfig {
    /// Config with reconnection turned on and the given bounds.
    pub fn reconnecting(
        max_reconnect_attempts: u32,
        min_delay_secs: u64,
        max_delay_secs: u64,
    ) -> Self {
        Self {
            reconnection: true,
            max_reconnect_attempts,
            min_delay_secs,
            max_delay_secs,
            interval_policy: IntervalPolicy::Fixed,
        }
    }

    /// Switch the interval policy.
    pub fn with_interval_policy(mut self, policy: IntervalPolicy) -> Self {
        self.interval_policy = policy;
        self
    }

    /// Validate bounds.
    ///
    /// # Errors
    ///
    /// - `min_delay_secs` must be > 0
    /// - `max_delay_secs` must be > 0
    /// - `min_delay_secs` must be <= `max_delay_secs`
    /// - `max_reconnect_attempts` must be > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| ConfigError::InvalidValue {
            field,
            reason: reason.to_string(),
        };

        if self.min_delay_secs == 0 {
            return Err(invalid("min_delay_secs", "must be > 0"));
        }
        if self.max_delay_secs == 0 {
            return Err(invalid("max_delay_secs", "must be > 0"));
        }
        if self.min_delay_secs > self.max_delay_secs {
            return Err(invalid("min_delay_secs", "must be <= max_delay_secs"));
        }
        if self.max_reconnect_attempts == 0 {
            return Err(invalid("max_reconnect_attempts", "must be > 0"));
        }
        Ok(())
    }
}
