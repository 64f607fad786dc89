//! [`SessionFactory`] implementation producing [`GithubClient`] sessions.

use std::sync::Arc;

use pipeline::{ForgeError, ForgeSession, SessionFactory};
use tracing::debug;

use crate::client::GithubClient;
use crate::config::{ConfigError, GithubConfig, TOKEN_ENV};

/// Builds GitHub sessions for the Authorize component.
pub struct GithubConnector {
    config: GithubConfig,
    environment_token: Option<String>,
}

impl std::fmt::Debug for GithubConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConnector")
            .field("config", &self.config)
            .field("environment_token", &self.environment_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GithubConnector {
    /// `environment_token` is the fallback credential; empty strings count as absent.
    pub fn new(config: GithubConfig, environment_token: Option<String>) -> Self {
        Self {
            config,
            environment_token: environment_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Reads the configuration and `GITHUB_TOKEN` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = GithubConfig::from_env()?;
        Ok(Self::new(config, std::env::var(TOKEN_ENV).ok()))
    }
}

impl SessionFactory for GithubConnector {
    fn from_token(&self, token: &str) -> Result<ForgeSession, ForgeError> {
        debug!(api_url = self.config.api_url(), "Building GitHub session from explicit token");
        Ok(Arc::new(GithubClient::new(&self.config, Some(token.to_owned()))?))
    }

    fn from_environment(&self) -> Result<ForgeSession, ForgeError> {
        debug!(
            api_url = self.config.api_url(),
            authenticated = self.environment_token.is_some(),
            "Building GitHub session from {TOKEN_ENV}"
        );
        Ok(Arc::new(GithubClient::new(&self.config, self.environment_token.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_environment_token_counts_as_absent() {
        let connector = GithubConnector::new(GithubConfig::default(), Some("  ".into()));
        assert!(connector.environment_token.is_none());
        assert!(connector.from_environment().is_ok());
    }

    #[test]
    fn debug_output_redacts_the_environment_token() {
        let connector = GithubConnector::new(GithubConfig::default(), Some("ghp_secret".into()));
        assert!(!format!("{connector:?}").contains("ghp_secret"));
    }
}
