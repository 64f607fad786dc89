//! GitHub adapter configuration.
//!
//! Values come from the environment (see the `*_ENV` constants) with the
//! defaults below; the CLI overrides them from its flags.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size requested from list endpoints (GitHub's maximum).
pub const DEFAULT_PER_PAGE: u8 = 100;

/// Token used when Authorize receives no explicit token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// API base URL override (GitHub Enterprise, test servers).
pub const API_URL_ENV: &str = "GITHUB_API_URL";

/// Request timeout override, in whole seconds.
pub const TIMEOUT_ENV: &str = "GITHUB_TIMEOUT_SECS";

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid GitHub API URL '{value}': {reason}")]
    InvalidApiUrl { value: String, reason: String },

    #[error("Invalid GITHUB_TIMEOUT_SECS value '{value}': expected a whole number of seconds")]
    InvalidTimeout { value: String },
}

/// Connection settings for [`crate::GithubClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct GithubConfig {
    /// Base URL without a trailing slash, e.g. `https://api.github.com` or
    /// `https://github.example.com/api/v3`.
    api_url: String,
    pub timeout: Duration,
    pub per_page: u8,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl GithubConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config = config.with_api_url(&url)?;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout { value: raw.clone() })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Replaces the API base URL after checking it parses as an absolute
    /// `http(s)` URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidApiUrl {
            value: url.to_owned(),
            reason,
        };
        let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        self.api_url = url.trim().trim_end_matches('/').to_owned();
        Ok(self)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}
