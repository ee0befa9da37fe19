//! User-facing credential operations.

use std::sync::Arc;
use std::time::Duration;

use syncauth_core::{Error, ErrorKind, Result, UserId, UserStore, normalize_email};
use syncauth_provider::OAuthRegistry;

use crate::TRACING_TARGET_CREDENTIALS;
use crate::service::{ConfirmOutcome, PasswordHasher, TokenManager, TokenPair, VerificationManager};

struct CredentialServiceInner {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenManager,
    verification: VerificationManager,
    oauth: OAuthRegistry,
}

/// Sign-up, login, logout, OAuth, refresh, validation and email verification.
///
/// Composes the token and verification managers with the password hasher
/// and the user store.
#[derive(Clone)]
pub struct CredentialService {
    inner: Arc<CredentialServiceInner>,
}

impl std::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService")
            .field("tokens", &self.inner.tokens)
            .field("verification", &self.inner.verification)
            .field("oauth", &self.inner.oauth)
            .finish_non_exhaustive()
    }
}

impl CredentialService {
    /// Creates the service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        tokens: TokenManager,
        verification: VerificationManager,
        oauth: OAuthRegistry,
    ) -> Self {
        let inner = CredentialServiceInner {
            users,
            hasher,
            tokens,
            verification,
            oauth,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the token manager.
    #[inline]
    pub fn tokens(&self) -> &TokenManager {
        &self.inner.tokens
    }

    /// Creates a password account and returns its id.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CREDENTIALS)]
    pub async fn signup(&self, email: &str, password: &str) -> Result<UserId> {
        let email = normalize_email(email);
        let digest = self.inner.hasher.hash_password(password)?;
        let user_id = self.inner.users.create_user(&email, Some(digest)).await?;

        tracing::info!(target: TRACING_TARGET_CREDENTIALS, %user_id, "Account created");
        Ok(user_id)
    }

    /// Checks a password and issues a token pair for `fingerprint`.
    ///
    /// Unknown accounts, passwordless accounts and wrong passwords are all
    /// reported as [`ErrorKind::InvalidCredentials`], and each of them pays
    /// for one password verification.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CREDENTIALS)]
    pub async fn login(&self, email: &str, password: &str, fingerprint: &str) -> Result<TokenPair> {
        let email = normalize_email(email);
        let user = match self.inner.users.user_by_email(&email).await {
            Ok(user) => Some(user),
            Err(e) if e.kind() == ErrorKind::UserNotFound => None,
            Err(e) => return Err(e),
        };

        let verified = match user.as_ref().and_then(|user| user.password_hash.as_deref()) {
            Some(digest) => match self.inner.hasher.verify_password(password, digest) {
                Ok(()) => true,
                Err(e) if e.kind() == ErrorKind::PasswordMismatch => false,
                Err(e) => return Err(e),
            },
            None => self.inner.hasher.verify_dummy_password(password),
        };

        let user = match user {
            Some(user) if verified => user,
            user => {
                tracing::warn!(
                    target: TRACING_TARGET_CREDENTIALS,
                    account_exists = user.is_some(),
                    "Login rejected"
                );
                return Err(Error::invalid_credentials());
            }
        };

        let pair = self.inner.tokens.issue_pair(user.id, fingerprint).await?;
        tracing::info!(target: TRACING_TARGET_CREDENTIALS, user_id = %user.id, "Login succeeded");
        Ok(pair)
    }

    /// Issues a token pair for an already authenticated user.
    pub async fn issue_tokens(&self, user_id: UserId, fingerprint: &str) -> Result<TokenPair> {
        self.inner.tokens.issue_pair(user_id, fingerprint).await
    }

    /// Signs in through an OAuth provider, creating a passwordless account on first use.
    #[tracing::instrument(skip(self, code, fingerprint), target = TRACING_TARGET_CREDENTIALS)]
    pub async fn oauth_login(
        &self,
        provider: &str,
        code: &str,
        fingerprint: &str,
    ) -> Result<TokenPair> {
        let provider = self.inner.oauth.resolve(provider)?;
        let email = normalize_email(&provider.authenticate(code).await?);
        let user_id = self.find_or_create_user(&email).await?;

        let pair = self.inner.tokens.issue_pair(user_id, fingerprint).await?;
        tracing::info!(
            target: TRACING_TARGET_CREDENTIALS,
            %user_id,
            provider = provider.name(),
            "OAuth login succeeded"
        );
        Ok(pair)
    }

    async fn find_or_create_user(&self, email: &str) -> Result<UserId> {
        let users = &self.inner.users;
        match users.user_by_email(email).await {
            Ok(user) => return Ok(user.id),
            Err(e) if e.kind() == ErrorKind::UserNotFound => {}
            Err(e) => return Err(e),
        }

        match users.create_user(email, None).await {
            Ok(user_id) => {
                tracing::info!(
                    target: TRACING_TARGET_CREDENTIALS,
                    %user_id,
                    "Passwordless account created"
                );
                Ok(user_id)
            }
            // Lost a race with a concurrent first login.
            Err(e) if e.kind() == ErrorKind::UserExists => Ok(users.user_by_email(email).await?.id),
            Err(e) => Err(e),
        }
    }

    /// Revokes the refresh tokens bound to `fingerprint` for the bearer of `access_token`.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CREDENTIALS)]
    pub async fn logout(&self, access_token: &str, fingerprint: &str) -> Result<()> {
        let user_id = self.inner.tokens.validate_access_token(access_token)?;
        self.inner
            .tokens
            .revoke_refresh_token(user_id, fingerprint)
            .await?;

        tracing::info!(target: TRACING_TARGET_CREDENTIALS, %user_id, "Logged out");
        Ok(())
    }

    /// Exchanges a refresh token for a new access token. The refresh token stays valid.
    pub async fn refresh(&self, refresh_token: &str, fingerprint: &str) -> Result<String> {
        let tokens = &self.inner.tokens;
        let user_id = tokens.validate_refresh_token(refresh_token, fingerprint).await?;
        tokens.issue_access_token(user_id)
    }

    /// Returns the user an access token was issued to.
    pub fn validate(&self, access_token: &str) -> Result<UserId> {
        self.inner.tokens.validate_access_token(access_token)
    }

    /// Issues a verification code for the bearer and emails it to their address.
    ///
    /// Returns the code lifetime.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CREDENTIALS)]
    pub async fn verify_email(&self, access_token: &str) -> Result<Duration> {
        let user_id = self.inner.tokens.validate_access_token(access_token)?;
        let user = self.inner.users.user_by_id(user_id).await?;

        let verification = &self.inner.verification;
        let code = verification.issue_code(user_id).await?;
        verification.send_code(&user.email, code).await?;

        tracing::info!(target: TRACING_TARGET_CREDENTIALS, %user_id, "Verification code sent");
        Ok(verification.code_ttl())
    }

    /// Checks a submitted code and marks the bearer's email verified on success.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_CREDENTIALS)]
    pub async fn confirm_code(&self, access_token: &str, code: u32) -> Result<ConfirmOutcome> {
        let user_id = self.inner.tokens.validate_access_token(access_token)?;
        let outcome = self.inner.verification.confirm_code(user_id, code).await?;

        if outcome.is_success() {
            self.inner.users.mark_email_verified(user_id).await?;
            tracing::info!(target: TRACING_TARGET_CREDENTIALS, %user_id, "Email verified");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use syncauth_core::MemoryUserStore;
    use syncauth_kv::{CodeStore, KeyValueStore, MemoryStore, SessionStore};
    use syncauth_provider::{MockMailbox, MockOAuthProvider};

    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    struct Harness {
        service: CredentialService,
        users: MemoryUserStore,
        mailbox: MockMailbox,
    }

    fn harness() -> Harness {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let users = MemoryUserStore::new();
        let mailbox = MockMailbox::new();

        let tokens = TokenManager::new(
            SECRET,
            Duration::from_secs(900),
            Duration::from_secs(3600),
            SessionStore::new(kv.clone()),
        );
        let verification = VerificationManager::new(
            CodeStore::new(kv),
            mailbox.service(),
            Duration::from_secs(120),
        );
        let oauth = OAuthRegistry::new().with_provider(
            "github",
            MockOAuthProvider::new()
                .with_account("new-code", "New@Example.com")
                .with_account("existing-code", "a@example.com"),
        );

        let service = CredentialService::new(
            Arc::new(users.clone()),
            PasswordHasher::new().expect("default hashing parameters are valid"),
            tokens,
            verification,
            oauth,
        );

        Harness {
            service,
            users,
            mailbox,
        }
    }

    fn code_from(body: &str) -> anyhow::Result<u32> {
        let code = body
            .split_whitespace()
            .find_map(|word| word.parse::<u32>().ok())
            .ok_or_else(|| anyhow::anyhow!("no code in body"))?;
        Ok(code)
    }

    #[tokio::test]
    async fn signup_login_logout_scenario() -> anyhow::Result<()> {
        let Harness { service, .. } = harness();
        let user_id = service.signup("a@example.com", "password123").await?;

        let error = service
            .login("a@example.com", "wrongpass", "fp")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidCredentials);

        let pair = service.login("A@Example.com ", "password123", "fp").await?;
        assert_eq!(service.validate(&pair.access_token)?, user_id);

        service.logout(&pair.access_token, "fp").await?;
        let error = service.refresh(&pair.refresh_token, "fp").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TokenNotFound);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() -> anyhow::Result<()> {
        let Harness { service, .. } = harness();
        service.signup("a@example.com", "password123").await?;

        let error = service
            .signup("A@EXAMPLE.COM", "password456")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UserExists);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() -> anyhow::Result<()> {
        let Harness { service, .. } = harness();
        let error = service
            .login("nobody@example.com", "password123", "fp")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidCredentials);
        Ok(())
    }

    #[tokio::test]
    async fn passwordless_account_cannot_login_with_password() -> anyhow::Result<()> {
        let Harness { service, users, .. } = harness();
        users.create_user("oauth@example.com", None).await?;

        let error = service
            .login("oauth@example.com", "password123", "fp")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidCredentials);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_issues_access_without_rotation() -> anyhow::Result<()> {
        let Harness { service, .. } = harness();
        let user_id = service.signup("a@example.com", "password123").await?;
        let pair = service.login("a@example.com", "password123", "fp").await?;

        let access = service.refresh(&pair.refresh_token, "fp").await?;
        assert_eq!(service.validate(&access)?, user_id);

        let again = service.refresh(&pair.refresh_token, "fp").await?;
        assert_eq!(service.validate(&again)?, user_id);
        Ok(())
    }

    #[tokio::test]
    async fn oauth_creates_then_reuses_account() -> anyhow::Result<()> {
        let Harness { service, users, .. } = harness();

        let pair = service.oauth_login("github", "new-code", "fp").await?;
        let user_id = service.validate(&pair.access_token)?;
        let user = users.user_by_id(user_id).await?;
        assert_eq!(user.email, "new@example.com");
        assert!(!user.has_password());

        let pair = service.oauth_login("github", "new-code", "fp").await?;
        assert_eq!(service.validate(&pair.access_token)?, user_id);
        assert_eq!(users.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn oauth_links_existing_password_account() -> anyhow::Result<()> {
        let Harness { service, .. } = harness();
        let user_id = service.signup("a@example.com", "password123").await?;

        let pair = service.oauth_login("github", "existing-code", "fp").await?;
        assert_eq!(service.validate(&pair.access_token)?, user_id);
        Ok(())
    }

    #[tokio::test]
    async fn oauth_failures() -> anyhow::Result<()> {
        let Harness { service, .. } = harness();

        let error = service
            .oauth_login("gitlab", "new-code", "fp")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnknownProvider);

        let error = service
            .oauth_login("github", "bad-code", "fp")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ProviderFailed);
        Ok(())
    }

    #[tokio::test]
    async fn email_verification_flow() -> anyhow::Result<()> {
        let Harness {
            service,
            users,
            mailbox,
        } = harness();
        let user_id = service.signup("a@example.com", "password123").await?;
        let pair = service.login("a@example.com", "password123", "fp").await?;

        let ttl = service.verify_email(&pair.access_token).await?;
        assert_eq!(ttl, Duration::from_secs(120));

        let sent = mailbox.last().await.ok_or_else(|| anyhow::anyhow!("no email"))?;
        assert_eq!(sent.to, "a@example.com");
        let code = code_from(&sent.body)?;

        let outcome = service.confirm_code(&pair.access_token, code).await?;
        assert_eq!(outcome, ConfirmOutcome::Confirmed);
        assert!(users.user_by_id(user_id).await?.email_verified);

        let outcome = service.confirm_code(&pair.access_token, code).await?;
        assert_eq!(outcome, ConfirmOutcome::Expired);
        Ok(())
    }

    #[tokio::test]
    async fn incorrect_code_leaves_email_unverified() -> anyhow::Result<()> {
        let Harness {
            service,
            users,
            mailbox,
        } = harness();
        let user_id = service.signup("a@example.com", "password123").await?;
        let pair = service.login("a@example.com", "password123", "fp").await?;

        service.verify_email(&pair.access_token).await?;
        let sent = mailbox.last().await.ok_or_else(|| anyhow::anyhow!("no email"))?;
        let code = code_from(&sent.body)?;
        let wrong = if code == 999_999 { 100_000 } else { code + 1 };

        let outcome = service.confirm_code(&pair.access_token, wrong).await?;
        assert_eq!(outcome, ConfirmOutcome::Incorrect);
        assert!(!users.user_by_id(user_id).await?.email_verified);
        Ok(())
    }

    #[tokio::test]
    async fn verification_requires_valid_token() -> anyhow::Result<()> {
        let Harness { service, .. } = harness();
        let error = service.verify_email("garbage").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidSignature);
        Ok(())
    }
}
