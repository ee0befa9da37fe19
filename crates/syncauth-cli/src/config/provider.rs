//! Collaborator construction from CLI configuration.

use std::sync::Arc;

use anyhow::Context;
use syncauth_core::UserStore;
use syncauth_kv::KeyValueStore;
use syncauth_postgres::{PgClient, PgConfig, run_pending_migrations};
use syncauth_provider::github::{GitHubClient, GitHubConfig};
use syncauth_provider::smtp::{SmtpClient, SmtpConfig};
use syncauth_provider::{EmailService, OAuthRegistry};

use super::Cli;
use crate::TRACING_TARGET_CONFIG;

/// Connects PostgreSQL and applies pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn create_user_store(config: &PgConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    let client = PgClient::connect(config.clone())
        .await
        .context("failed to connect to PostgreSQL")?;

    let applied = run_pending_migrations(&client)
        .await
        .context("failed to apply database migrations")?;
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        applied = applied.len(),
        "Database schema is up to date"
    );

    Ok(Arc::new(client))
}

/// Connects the configured key-value backend.
///
/// The NATS bucket age limit covers the longest lifetime written to it.
pub async fn create_key_value_store(cli: &Cli) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let longest = cli
        .service
        .refresh_ttl()?
        .max(cli.service.code_ttl()?);

    cli.kv
        .connect(Some(longest))
        .await
        .context("failed to connect key-value store")
}

/// Creates the SMTP-backed email service.
pub fn create_email_service(config: &SmtpConfig) -> anyhow::Result<EmailService> {
    let client = SmtpClient::new(config.clone()).context("failed to create SMTP client")?;
    Ok(client.into_service())
}

/// Registers every configured OAuth provider.
///
/// GitHub is skipped when its client credentials are absent.
pub fn create_oauth_registry(github: &GitHubConfig) -> anyhow::Result<OAuthRegistry> {
    let mut registry = OAuthRegistry::new();

    if github.is_configured() {
        let client = GitHubClient::new(github.clone()).context("failed to create GitHub client")?;
        registry = client.register(registry);
    }

    if registry.is_empty() {
        tracing::warn!(
            target: TRACING_TARGET_CONFIG,
            "No OAuth providers configured, OAuth login is disabled"
        );
    } else {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            providers = ?registry.names().collect::<Vec<_>>(),
            "OAuth providers registered"
        );
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_github_is_skipped() -> anyhow::Result<()> {
        let config = GitHubConfig::default();
        let registry = create_oauth_registry(&config)?;
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn configured_github_is_registered() -> anyhow::Result<()> {
        let config = GitHubConfig::new("client-id", "client-secret");
        let registry = create_oauth_registry(&config)?;
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["github"]);
        Ok(())
    }
}
