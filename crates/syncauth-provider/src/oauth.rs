//! OAuth provider seam, its logging wrapper, and the name registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use syncauth_core::{Error, ErrorKind, Result};

use crate::TRACING_TARGET_OAUTH;

/// An external identity provider reached through the authorization-code flow.
///
/// Implementations report failures as
/// [`ErrorKind::ProviderFailed`](syncauth_core::ErrorKind::ProviderFailed).
#[async_trait::async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Exchanges an authorization code for a provider access token.
    async fn exchange_code(&self, code: &str) -> Result<String>;

    /// Resolves the account's primary, verified email address.
    async fn fetch_verified_email(&self, access_token: &str) -> Result<String>;
}

/// OAuth provider wrapper with observability.
#[derive(Clone)]
pub struct OAuthService {
    name: Arc<str>,
    inner: Arc<dyn OAuthProvider>,
}

impl fmt::Debug for OAuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthService")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl OAuthService {
    /// Wraps `provider` under the given name.
    pub fn new<P>(name: impl Into<Arc<str>>, provider: P) -> Self
    where
        P: OAuthProvider + 'static,
    {
        Self {
            name: name.into(),
            inner: Arc::new(provider),
        }
    }

    /// Returns the provider name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exchanges an authorization code for the account's verified email.
    pub async fn authenticate(&self, code: &str) -> Result<String> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET_OAUTH,
            provider = %self.name,
            "Exchanging authorization code"
        );

        let result = self.exchange_and_fetch(code).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!(
                    target: TRACING_TARGET_OAUTH,
                    provider = %self.name,
                    elapsed_ms = elapsed.as_millis(),
                    "Resolved verified email"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_OAUTH,
                    provider = %self.name,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "OAuth authentication failed"
                );
            }
        }

        result
    }

    async fn exchange_and_fetch(&self, code: &str) -> Result<String> {
        let access_token = self.inner.exchange_code(code).await?;
        self.inner.fetch_verified_email(&access_token).await
    }
}

/// Providers addressable by name, e.g. `github`.
#[derive(Debug, Clone, Default)]
pub struct OAuthRegistry {
    providers: BTreeMap<String, OAuthService>,
}

impl OAuthRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under `name`, replacing any previous entry.
    #[must_use]
    pub fn with_provider<P>(mut self, name: &str, provider: P) -> Self
    where
        P: OAuthProvider + 'static,
    {
        let name = name.to_ascii_lowercase();
        self.providers
            .insert(name.clone(), OAuthService::new(name, provider));
        self
    }

    /// Looks up a provider by name.
    pub fn resolve(&self, name: &str) -> Result<&OAuthService> {
        self.providers.get(name).ok_or_else(|| {
            Error::new(ErrorKind::UnknownProvider)
                .with_message(format!("Unknown OAuth provider: {name}"))
        })
    }

    /// Returns the registered provider names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Returns whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait::async_trait]
    impl OAuthProvider for Fixed {
        async fn exchange_code(&self, code: &str) -> Result<String> {
            Ok(format!("token-{code}"))
        }

        async fn fetch_verified_email(&self, access_token: &str) -> Result<String> {
            assert_eq!(access_token, "token-abc");
            Ok("user@example.com".into())
        }
    }

    #[tokio::test]
    async fn resolves_registered_provider() -> anyhow::Result<()> {
        let registry = OAuthRegistry::new().with_provider("GitHub", Fixed);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["github"]);

        let email = registry.resolve("github")?.authenticate("abc").await?;
        assert_eq!(email, "user@example.com");
        Ok(())
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let registry = OAuthRegistry::new();
        let error = registry.resolve("gitlab").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownProvider);
        assert!(registry.is_empty());
    }
}
