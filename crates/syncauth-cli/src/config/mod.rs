//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig         # Host, port, shutdown
//! ├── middleware: MiddlewareConfig # CORS, request timeout
//! ├── service: ServiceConfig       # Token secret and lifetimes
//! ├── postgres: PgConfig           # User store
//! ├── kv: KvConfig                 # Session and code store
//! ├── smtp: SmtpConfig             # Verification email relay
//! └── github: GitHubConfig         # GitHub OAuth application
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod middleware;
mod provider;
mod server;

use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
pub use middleware::MiddlewareConfig;
pub use provider::{
    create_email_service, create_key_value_store, create_oauth_registry, create_user_store,
};
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use syncauth_kv::KvConfig;
use syncauth_postgres::PgConfig;
use syncauth_provider::github::GitHubConfig;
use syncauth_provider::smtp::SmtpConfig;
use syncauth_server::service::ServiceConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Output format of log lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "syncauth")]
#[command(about = "Credential and session lifecycle server")]
#[command(version)]
pub struct Cli {
    /// Log line format. Filtering follows `RUST_LOG`.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    #[serde(default)]
    pub log_format: LogFormat,

    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Token and verification configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// PostgreSQL user store.
    #[clap(flatten)]
    pub postgres: PgConfig,

    /// Key-value store holding sessions and verification codes.
    #[clap(flatten)]
    pub kv: KvConfig,

    /// SMTP relay for verification emails.
    #[clap(flatten)]
    pub smtp: SmtpConfig,

    /// GitHub OAuth application.
    #[clap(flatten)]
    pub github: GitHubConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        match self.log_format {
            LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
                .init(),
        }
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.service
            .validate()
            .context("invalid token configuration")?;
        self.postgres
            .validate()
            .context("invalid database configuration")?;
        self.kv
            .validate()
            .context("invalid key-value store configuration")?;
        self.smtp
            .validate()
            .context("invalid SMTP configuration")?;
        self.github
            .validate()
            .context("invalid GitHub configuration")?;
        Ok(())
    }

    /// Logs configuration at info level (no sensitive information).
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            "Starting syncauth server"
        );

        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            access_ttl = %self.service.tokens_access_ttl,
            refresh_ttl = %self.service.tokens_refresh_ttl,
            code_ttl = %self.service.email_code_ttl,
            "Token configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            database_url = %self.postgres.database_url_masked(),
            postgres_max_connections = self.postgres.postgres_max_connections,
            kv_backend = ?self.kv.kv_backend,
            smtp_host = %self.smtp.smtp_host,
            smtp_port = self.smtp.smtp_port,
            github_enabled = self.github.is_configured(),
            "Collaborator configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_minimal_arguments() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "syncauth",
            "--tokens-secret",
            "0123456789abcdef0123456789abcdef",
            "--postgres-url",
            "postgresql://localhost/syncauth",
            "--smtp-host",
            "smtp.example.com",
            "--smtp-sender",
            "no-reply@example.com",
            "--kv-backend",
            "memory",
            "--log-format",
            "json",
        ])?;

        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.server.port, 3000);
        assert!(!cli.github.is_configured());
        cli.validate()?;
        Ok(())
    }

    #[test]
    fn short_secret_fails_validation() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "syncauth",
            "--tokens-secret",
            "short",
            "--postgres-url",
            "postgresql://localhost/syncauth",
            "--smtp-host",
            "smtp.example.com",
            "--smtp-sender",
            "no-reply@example.com",
        ])?;

        let error = cli.validate().unwrap_err();
        assert!(format!("{error:#}").contains("invalid token configuration"));
        Ok(())
    }
}
