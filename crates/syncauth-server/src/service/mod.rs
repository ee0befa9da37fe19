//! Application state and dependency injection.

mod config;
mod credentials;
mod password_hasher;
mod tokens;
mod verification;

use std::sync::Arc;

use syncauth_core::{Result, UserStore};
use syncauth_kv::{CodeStore, KeyValueStore, SessionStore};
use syncauth_provider::{EmailService, OAuthRegistry};

pub use crate::service::config::{ServiceConfig, humanize_ttl};
pub use crate::service::credentials::CredentialService;
pub use crate::service::password_hasher::PasswordHasher;
pub use crate::service::tokens::{AccessClaims, TokenManager, TokenPair};
pub use crate::service::verification::{
    ConfirmOutcome, EMAIL_SUBJECT, MAX_CODE, MIN_CODE, VerificationManager, verification_email,
};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub credentials: CredentialService,
    pub tokens: TokenManager,
}

impl ServiceState {
    /// Builds every service from configuration and already connected collaborators.
    ///
    /// Session entries and verification codes share `kv` under distinct key prefixes.
    pub fn new(
        config: &ServiceConfig,
        users: Arc<dyn UserStore>,
        kv: Arc<dyn KeyValueStore>,
        email: EmailService,
        oauth: OAuthRegistry,
    ) -> Result<Self> {
        config.validate()?;

        let tokens = TokenManager::new(
            config.secret(),
            config.access_ttl()?,
            config.refresh_ttl()?,
            SessionStore::new(kv.clone()),
        );
        let verification = VerificationManager::new(CodeStore::new(kv), email, config.code_ttl()?);

        let credentials = CredentialService::new(
            users,
            PasswordHasher::new()?,
            tokens.clone(),
            verification,
            oauth,
        );

        Ok(Self {
            credentials,
            tokens,
        })
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(credentials: CredentialService);
impl_di!(tokens: TokenManager);

#[cfg(test)]
mod tests {
    use syncauth_core::{ErrorKind, MemoryUserStore};
    use syncauth_kv::MemoryStore;
    use syncauth_provider::MockMailbox;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn build(config: &ServiceConfig) -> Result<ServiceState> {
        ServiceState::new(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryStore::new()),
            MockMailbox::new().service(),
            OAuthRegistry::new(),
        )
    }

    #[test]
    fn state_uses_configured_ttls() -> anyhow::Result<()> {
        let config = ServiceConfig::new(SECRET)
            .with_access_ttl("5m")
            .with_refresh_ttl("1h");
        let state = build(&config)?;

        assert_eq!(state.tokens.access_ttl().as_secs(), 300);
        assert_eq!(state.tokens.refresh_ttl().as_secs(), 3600);
        Ok(())
    }

    #[test]
    fn short_secret_is_rejected() {
        let error = build(&ServiceConfig::new("short")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn state_services_share_sessions() -> anyhow::Result<()> {
        let state = build(&ServiceConfig::new(SECRET))?;
        let user_id = state.credentials.signup("a@example.com", "password123").await?;
        let pair = state.credentials.issue_tokens(user_id, "fp").await?;

        let validated = state
            .tokens
            .validate_refresh_token(&pair.refresh_token, "fp")
            .await?;
        assert_eq!(validated, user_id);
        Ok(())
    }
}
