use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config_env::{optional_trimmed_env, parse_u32_env, parse_u64_env};
use crate::retry::RetryConfig;

const DEFAULT_POSTS_API_URL: &str = "https://dummyjson.com/posts";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_SECONDS: u32 = 3;
const DEFAULT_RETRY_SETTLE_MS: u64 = 800;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub posts_api_url: String,
    pub fetch_timeout_ms: u64,
    pub retry_max_attempts: u32,
    pub retry_delay_seconds: u32,
    pub retry_settle_ms: u64,
    pub search_debounce_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            posts_api_url: DEFAULT_POSTS_API_URL.to_string(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            retry_delay_seconds: DEFAULT_RETRY_DELAY_SECONDS,
            retry_settle_ms: DEFAULT_RETRY_SETTLE_MS,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            posts_api_url: optional_trimmed_env("POSTS_API_URL")
                .unwrap_or_else(|| DEFAULT_POSTS_API_URL.to_string()),
            fetch_timeout_ms: parse_u64_env("POSTS_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS)?,
            retry_max_attempts: parse_u32_env("RETRY_MAX_ATTEMPTS", DEFAULT_RETRY_MAX_ATTEMPTS)?,
            retry_delay_seconds: parse_u32_env("RETRY_DELAY_SECONDS", DEFAULT_RETRY_DELAY_SECONDS)?,
            retry_settle_ms: parse_u64_env("RETRY_SETTLE_MS", DEFAULT_RETRY_SETTLE_MS)?,
            search_debounce_ms: parse_u64_env("SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.posts_api_url).map_err(|err| {
            ConfigError::InvalidConfiguration(format!("POSTS_API_URL is not a valid URL: {err}"))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidConfiguration(
                "POSTS_API_URL must start with http:// or https://".to_string(),
            ));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "POSTS_FETCH_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }
        if self.retry_max_attempts == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "RETRY_MAX_ATTEMPTS must be greater than 0".to_string(),
            ));
        }
        if self.retry_delay_seconds == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "RETRY_DELAY_SECONDS must be greater than 0".to_string(),
            ));
        }
        if self.retry_settle_ms == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "RETRY_SETTLE_MS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(self.retry_max_attempts, self.retry_delay_seconds)
            .with_settle_delay(Duration::from_millis(self.retry_settle_ms))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
