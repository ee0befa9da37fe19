//! SMTP client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// Default submission port with STARTTLS.
pub const DEFAULT_PORT: u16 = 587;

/// Default timeout for an SMTP exchange: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the SMTP relay.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SmtpConfig {
    /// SMTP relay host name
    #[cfg_attr(feature = "config", arg(long = "smtp-host", env = "SMTP_HOST"))]
    pub smtp_host: String,

    /// SMTP relay port
    #[cfg_attr(
        feature = "config",
        arg(long = "smtp-port", env = "SMTP_PORT", default_value = "587")
    )]
    #[serde(default = "default_port")]
    pub smtp_port: u16,

    /// SMTP user name
    #[cfg_attr(feature = "config", arg(long = "smtp-username", env = "SMTP_USERNAME"))]
    #[serde(default)]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[cfg_attr(feature = "config", arg(long = "smtp-password", env = "SMTP_PASSWORD"))]
    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Sender address placed in the From header
    #[cfg_attr(feature = "config", arg(long = "smtp-sender", env = "SMTP_SENDER"))]
    pub smtp_sender: String,

    /// SMTP exchange timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "smtp-timeout", env = "SMTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub smtp_timeout: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "****"))
            .field("smtp_sender", &self.smtp_sender)
            .field("smtp_timeout", &self.smtp_timeout)
            .finish()
    }
}

impl SmtpConfig {
    /// Creates a configuration for `host` sending as `sender`.
    pub fn new(host: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            smtp_host: host.into(),
            smtp_port: DEFAULT_PORT,
            smtp_username: None,
            smtp_password: None,
            smtp_sender: sender.into(),
            smtp_timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.smtp_username = Some(username.into());
        self.smtp_password = Some(password.into());
        self
    }

    /// Set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.smtp_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.smtp_timeout)
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.smtp_host.trim().is_empty() {
            return Err(Error::InvalidConfig("SMTP host cannot be empty".into()));
        }
        if self.smtp_port == 0 {
            return Err(Error::InvalidConfig("SMTP port cannot be 0".into()));
        }
        if self.smtp_username.is_some() != self.smtp_password.is_some() {
            return Err(Error::InvalidConfig(
                "SMTP username and password must be set together".into(),
            ));
        }
        self.smtp_sender.parse::<lettre::message::Mailbox>()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SmtpConfig::new("smtp.example.com", "noreply@example.com");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn credentials_must_be_paired() {
        let mut config = SmtpConfig::new("smtp.example.com", "noreply@example.com")
            .with_credentials("user", "secret");
        assert!(config.validate().is_ok());

        config.smtp_password = None;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_bad_sender_and_host() {
        let config = SmtpConfig::new("smtp.example.com", "not an address");
        assert!(matches!(config.validate(), Err(Error::Address(_))));

        let config = SmtpConfig::new(" ", "noreply@example.com");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn debug_hides_password() {
        let config = SmtpConfig::new("smtp.example.com", "noreply@example.com")
            .with_credentials("user", "hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
    }
}
