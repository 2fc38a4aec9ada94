use std::time::Duration;

use thiserror::Error;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_DELAY_SECONDS: u32 = 5;
const DEFAULT_SETTLE_DELAY_MS: u64 = 800;
const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Knobs for one error/retry panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub retry_delay_seconds: u32,
    /// Pause between "Retrying..." becoming visible and the retry action firing.
    pub settle_delay: Duration,
    pub tick_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_seconds: DEFAULT_RETRY_DELAY_SECONDS,
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, retry_delay_seconds: u32) -> Self {
        Self {
            max_attempts,
            retry_delay_seconds,
            ..Self::default()
        }
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn validate(&self) -> Result<(), RetryConfigError> {
        if self.max_attempts == 0 {
            return Err(RetryConfigError::InvalidConfiguration(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.retry_delay_seconds == 0 {
            return Err(RetryConfigError::InvalidConfiguration(
                "retry_delay_seconds must be greater than 0".to_string(),
            ));
        }
        if self.settle_delay.is_zero() {
            return Err(RetryConfigError::InvalidConfiguration(
                "settle_delay must be greater than 0".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(RetryConfigError::InvalidConfiguration(
                "tick_interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryConfigError {
    #[error("invalid retry configuration: {0}")]
    InvalidConfiguration(String),
}
