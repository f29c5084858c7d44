//! Connection settings for building a [`RedmineClient`].
//!
//! The client itself never reads the environment; callers construct a
//! [`Config`] (from flags, environment or any other store) and hand it to
//! [`RedmineClient::from_config`].
//!
//! [`RedmineClient`]: crate::RedmineClient
//! [`RedmineClient::from_config`]: crate::RedmineClient::from_config

use std::env;
use std::time::Duration;

use crate::client::DEFAULT_TIMEOUT;
use crate::error::{RedmineError, Result};

/// Environment variable holding the Redmine base URL.
pub const URL_ENV: &str = "REDMINE_URL";
/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "REDMINE_API_KEY";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "REDMINE_TIMEOUT_SECS";

/// Validated connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Root URL of the Redmine instance.
    pub base_url: String,
    /// API access key.
    pub api_key: String,
    /// HTTP timeout for a single request.
    pub timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Build a config, rejecting blank values.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::Config`] if either value is blank.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let api_key = api_key.into();

        if base_url.trim().is_empty() {
            return Err(RedmineError::Config(format!("{URL_ENV} is not set")));
        }
        if api_key.trim().is_empty() {
            return Err(RedmineError::Config(format!("{API_KEY_ENV} is not set")));
        }

        Ok(Self {
            base_url,
            api_key,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `REDMINE_URL`, `REDMINE_API_KEY` and optionally
    /// `REDMINE_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the timeout is
    /// not a whole number of seconds.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(URL_ENV).unwrap_or_default();
        let api_key = env::var(API_KEY_ENV).unwrap_or_default();
        let config = Self::new(base_url, api_key)?;

        match env::var(TIMEOUT_ENV) {
            Ok(raw) => Ok(config.with_timeout(parse_timeout(&raw)?)),
            Err(_) => Ok(config),
        }
    }
}

/// Parse a timeout given in whole seconds.
pub fn parse_timeout(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| {
            RedmineError::Config(format!(
                "{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'"
            ))
        })
}
