//! `[reload]` section configuration.
//!
//! Timing of the reload cycle.
//!
//! # Example
//!
//! ```toml
//! [reload]
//! retry_attempts = 50         # Page fetch attempts before falling back
//! retry_delay_ms = 100        # Pause between attempts
//! close_grace_ms = 1000       # Delay between channel loss and full reload
//! frame_ms = 16               # Frame boundary before island re-activation
//! request_timeout_ms = 2000   # Per-request HTTP timeout
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::reconcile::FRAME_INTERVAL;
use crate::reload::RetryPolicy;
use crate::reload::session::CLOSE_GRACE;

/// Reload cycle timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub close_grace_ms: u64,
    pub frame_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            retry_attempts: RetryPolicy::DEFAULT_ATTEMPTS,
            retry_delay_ms: millis(RetryPolicy::DEFAULT_DELAY),
            close_grace_ms: millis(CLOSE_GRACE),
            frame_ms: millis(FRAME_INTERVAL),
            request_timeout_ms: 2000,
        }
    }
}

#[allow(clippy::cast_possible_truncation)] // Defaults are small constants
const fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

impl ReloadConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub const fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }

    pub const fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_attempts == 0 {
            return Err(ConfigError::Validation(
                "reload.retry_attempts must be at least 1".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "reload.request_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::test_parse_config;

    #[test]
    fn test_reload_config_defaults() {
        let config = test_parse_config("");
        let reload = &config.reload;

        assert_eq!(reload.retry_attempts, 50);
        assert_eq!(reload.retry_delay_ms, 100);
        assert_eq!(reload.close_grace(), Duration::from_millis(1000));
        assert_eq!(reload.frame(), Duration::from_millis(16));
        assert_eq!(reload.request_timeout(), Duration::from_millis(2000));
        assert!(reload.validate().is_ok());
    }

    #[test]
    fn test_reload_config_partial_override() {
        let config = test_parse_config("[reload]\nretry_attempts = 5\nclose_grace_ms = 250");

        assert_eq!(config.reload.retry_policy().attempts(), 5);
        assert_eq!(config.reload.retry_policy().delay(), Duration::from_millis(100));
        assert_eq!(config.reload.close_grace(), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = test_parse_config("[reload]\nretry_attempts = 0");
        assert!(config.reload.validate().is_err());
    }
}
