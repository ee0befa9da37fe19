//! GitHub provider configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Error, Result};

/// Default authorization-code exchange endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the GitHub OAuth application.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct GitHubConfig {
    /// OAuth application client id
    #[cfg_attr(
        feature = "config",
        arg(long = "github-client-id", env = "GITHUB_CLIENT_ID")
    )]
    #[serde(default)]
    pub github_client_id: Option<String>,

    /// OAuth application client secret
    #[cfg_attr(
        feature = "config",
        arg(long = "github-client-secret", env = "GITHUB_CLIENT_SECRET")
    )]
    #[serde(default)]
    pub github_client_secret: Option<String>,

    /// Redirect URL registered with the OAuth application
    #[cfg_attr(
        feature = "config",
        arg(long = "github-redirect-url", env = "GITHUB_REDIRECT_URL")
    )]
    #[serde(default)]
    pub github_redirect_url: Option<String>,

    /// Authorization-code exchange endpoint
    #[cfg_attr(
        feature = "config",
        arg(
            long = "github-token-url",
            env = "GITHUB_TOKEN_URL",
            default_value = DEFAULT_TOKEN_URL
        )
    )]
    #[serde(default = "default_token_url")]
    pub github_token_url: String,

    /// REST API base URL
    #[cfg_attr(
        feature = "config",
        arg(
            long = "github-api-url",
            env = "GITHUB_API_URL",
            default_value = DEFAULT_API_URL
        )
    )]
    #[serde(default = "default_api_url")]
    pub github_api_url: String,

    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "github-timeout", env = "GITHUB_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub github_timeout: u64,
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_owned()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            github_client_id: None,
            github_client_secret: None,
            github_redirect_url: None,
            github_token_url: default_token_url(),
            github_api_url: default_api_url(),
            github_timeout: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("github_client_id", &self.github_client_id)
            .field(
                "github_client_secret",
                &self.github_client_secret.as_ref().map(|_| "****"),
            )
            .field("github_redirect_url", &self.github_redirect_url)
            .field("github_token_url", &self.github_token_url)
            .field("github_api_url", &self.github_api_url)
            .field("github_timeout", &self.github_timeout)
            .finish()
    }
}

impl GitHubConfig {
    /// Creates a configuration for the given OAuth application.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            github_client_id: Some(client_id.into()),
            github_client_secret: Some(client_secret.into()),
            ..Self::default()
        }
    }

    /// Returns whether both client credentials are present.
    pub fn is_configured(&self) -> bool {
        self.github_client_id.is_some() && self.github_client_secret.is_some()
    }

    /// Set the redirect URL.
    #[must_use]
    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.github_redirect_url = Some(redirect_url.into());
        self
    }

    /// Point both endpoints at another host.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        self.github_token_url = token_url.into();
        self.github_api_url = api_url.into();
        self
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.github_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.github_timeout)
        }
    }

    /// Validates the settings.
    ///
    /// Client id and secret must be set together, and both endpoints must be URLs.
    pub fn validate(&self) -> Result<()> {
        match (&self.github_client_id, &self.github_client_secret) {
            (Some(_), None) => return Err(Error::NotConfigured("client secret")),
            (None, Some(_)) => return Err(Error::NotConfigured("client id")),
            _ => {}
        }

        Url::parse(&self.github_token_url)?;
        Url::parse(&self.github_api_url)?;
        Ok(())
    }

    /// Returns the user agent sent with every request.
    pub fn user_agent(&self) -> String {
        format!("syncauth/{}", env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unconfigured() {
        let config = GitHubConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.github_token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn validate_requires_paired_credentials() {
        let mut config = GitHubConfig::default();
        assert!(config.validate().is_ok());

        config.github_client_id = Some("id".into());
        assert!(matches!(
            config.validate(),
            Err(Error::NotConfigured("client secret"))
        ));

        let config = GitHubConfig::new("id", "secret").with_endpoints("not a url", DEFAULT_API_URL);
        assert!(matches!(config.validate(), Err(Error::Url(_))));
    }

    #[test]
    fn debug_hides_secret() {
        let config = GitHubConfig::new("id", "very-secret");
        assert!(config.is_configured());
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
