//! Token and verification settings.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use jiff::SignedDuration;
use jiff::fmt::friendly::SpanPrinter;
use serde::{Deserialize, Serialize};
use syncauth_core::{Error, Result};

/// Minimum length of the signing secret in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default values for configuration options.
mod defaults {
    /// Default access token lifetime.
    pub const ACCESS_TTL: &str = "15m";

    /// Default refresh token lifetime.
    pub const REFRESH_TTL: &str = "240h";

    /// Default verification code lifetime.
    pub const CODE_TTL: &str = "120s";
}

/// Configuration of the credential services.
///
/// Lifetimes accept friendly durations such as `15m`, `240h` or `2 minutes`.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Shared HMAC secret used to sign access tokens
    #[cfg_attr(feature = "config", arg(long = "tokens-secret", env = "TOKENS_SECRET"))]
    pub tokens_secret: String,

    /// Access token lifetime
    #[cfg_attr(
        feature = "config",
        arg(long = "tokens-access-ttl", env = "TOKENS_ACCESS_TTL", default_value = defaults::ACCESS_TTL)
    )]
    #[serde(default = "default_access_ttl")]
    pub tokens_access_ttl: String,

    /// Refresh token lifetime
    #[cfg_attr(
        feature = "config",
        arg(long = "tokens-refresh-ttl", env = "TOKENS_REFRESH_TTL", default_value = defaults::REFRESH_TTL)
    )]
    #[serde(default = "default_refresh_ttl")]
    pub tokens_refresh_ttl: String,

    /// Email verification code lifetime
    #[cfg_attr(
        feature = "config",
        arg(long = "email-code-ttl", env = "EMAIL_CODE_TTL", default_value = defaults::CODE_TTL)
    )]
    #[serde(default = "default_code_ttl")]
    pub email_code_ttl: String,
}

fn default_access_ttl() -> String {
    defaults::ACCESS_TTL.to_owned()
}

fn default_refresh_ttl() -> String {
    defaults::REFRESH_TTL.to_owned()
}

fn default_code_ttl() -> String {
    defaults::CODE_TTL.to_owned()
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("tokens_secret", &"****")
            .field("tokens_access_ttl", &self.tokens_access_ttl)
            .field("tokens_refresh_ttl", &self.tokens_refresh_ttl)
            .field("email_code_ttl", &self.email_code_ttl)
            .finish()
    }
}

impl ServiceConfig {
    /// Creates a configuration with default lifetimes.
    pub fn new(tokens_secret: impl Into<String>) -> Self {
        Self {
            tokens_secret: tokens_secret.into(),
            tokens_access_ttl: default_access_ttl(),
            tokens_refresh_ttl: default_refresh_ttl(),
            email_code_ttl: default_code_ttl(),
        }
    }

    /// Set the access token lifetime.
    pub fn with_access_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.tokens_access_ttl = ttl.into();
        self
    }

    /// Set the refresh token lifetime.
    pub fn with_refresh_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.tokens_refresh_ttl = ttl.into();
        self
    }

    /// Set the verification code lifetime.
    pub fn with_code_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.email_code_ttl = ttl.into();
        self
    }

    /// Returns the signing secret.
    pub fn secret(&self) -> &[u8] {
        self.tokens_secret.as_bytes()
    }

    /// Returns the parsed access token lifetime.
    pub fn access_ttl(&self) -> Result<Duration> {
        parse_ttl("tokens access TTL", &self.tokens_access_ttl)
    }

    /// Returns the parsed refresh token lifetime.
    pub fn refresh_ttl(&self) -> Result<Duration> {
        parse_ttl("tokens refresh TTL", &self.tokens_refresh_ttl)
    }

    /// Returns the parsed verification code lifetime.
    pub fn code_ttl(&self) -> Result<Duration> {
        parse_ttl("email code TTL", &self.email_code_ttl)
    }

    /// Validates the secret and every lifetime.
    pub fn validate(&self) -> Result<()> {
        if self.tokens_secret.len() < MIN_SECRET_LEN {
            return Err(Error::invalid_input().with_message(format!(
                "Tokens secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        self.access_ttl()?;
        self.refresh_ttl()?;
        self.code_ttl()?;
        Ok(())
    }
}

fn parse_ttl(name: &str, value: &str) -> Result<Duration> {
    let parsed: SignedDuration = value.trim().parse().map_err(|e| {
        Error::invalid_input().with_message(format!("Invalid {name} '{value}': {e}"))
    })?;

    match Duration::try_from(parsed) {
        Ok(ttl) if !ttl.is_zero() => Ok(ttl),
        _ => Err(Error::invalid_input().with_message(format!("{name} must be positive"))),
    }
}

/// Renders a lifetime in the friendly compact form, e.g. `2m` or `1h 30m`.
pub fn humanize_ttl(ttl: Duration) -> String {
    match SignedDuration::try_from(ttl) {
        Ok(duration) => SpanPrinter::new().duration_to_string(&duration),
        Err(_) => format!("{}s", ttl.as_secs()),
    }
}
