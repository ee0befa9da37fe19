//! Access and refresh token issuance, validation and revocation.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use jiff::Timestamp;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use syncauth_core::{Error, ErrorKind, Result, UserId};
use syncauth_kv::SessionStore;

use crate::TRACING_TARGET_TOKENS;

/// Number of random bytes in a refresh token.
const REFRESH_TOKEN_BYTES: usize = 32;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User identifier as a decimal string.
    pub sub: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expires-at, unix seconds.
    pub exp: i64,
}

/// An access token together with its refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Signed access token.
    pub access_token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
}

struct TokenManagerInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
    sessions: SessionStore,
}

/// Mints, verifies and revokes access and refresh tokens.
///
/// Access tokens are stateless HS256 JWTs. Refresh tokens are random,
/// bound to a device fingerprint, and valid exactly as long as their
/// session store entry exists.
#[derive(Clone)]
pub struct TokenManager {
    inner: Arc<TokenManagerInner>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("access_ttl", &self.inner.access_ttl)
            .field("refresh_ttl", &self.inner.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Creates a token manager signing with `secret`.
    pub fn new(
        secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
        sessions: SessionStore,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let inner = TokenManagerInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
            sessions,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the access token lifetime.
    #[inline]
    pub fn access_ttl(&self) -> Duration {
        self.inner.access_ttl
    }

    /// Returns the refresh token lifetime.
    #[inline]
    pub fn refresh_ttl(&self) -> Duration {
        self.inner.refresh_ttl
    }

    /// Signs an access token for `user_id` valid for the access lifetime.
    pub fn issue_access_token(&self, user_id: UserId) -> Result<String> {
        let now = Timestamp::now().as_second();
        let ttl = i64::try_from(self.inner.access_ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &AccessClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.inner.encoding_key).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_TOKENS,
                error = %e,
                sub = %claims.sub,
                "Failed to sign access token"
            );
            Error::new(ErrorKind::SigningError).with_source(e)
        })
    }

    /// Verifies an access token and returns its subject.
    ///
    /// Signature and structure are checked before expiry, so a forged
    /// expired token reports [`ErrorKind::InvalidSignature`].
    pub fn validate_access_token(&self, token: &str) -> Result<UserId> {
        let data = decode::<AccessClaims>(token, &self.inner.decoding_key, &self.inner.validation)
            .map_err(|e| {
                let kind = match e.kind() {
                    JwtErrorKind::ExpiredSignature => ErrorKind::Expired,
                    _ => ErrorKind::InvalidSignature,
                };
                tracing::debug!(
                    target: TRACING_TARGET_TOKENS,
                    error = %e,
                    kind = ?kind,
                    "Access token rejected"
                );
                Error::new(kind)
            })?;

        data.claims.sub.parse::<UserId>().map_err(|e| {
            tracing::debug!(
                target: TRACING_TARGET_TOKENS,
                error = %e,
                "Access token subject is not a user id"
            );
            Error::new(ErrorKind::MalformedClaims)
        })
    }

    /// Mints a refresh token for `user_id` on the device `fingerprint` and persists it.
    #[tracing::instrument(skip(self, fingerprint), target = TRACING_TARGET_TOKENS)]
    pub async fn issue_refresh_token(&self, user_id: UserId, fingerprint: &str) -> Result<String> {
        let bytes: [u8; REFRESH_TOKEN_BYTES] = rand::random();
        let token = URL_SAFE.encode(bytes);

        self.inner
            .sessions
            .insert(user_id, &token, fingerprint, self.inner.refresh_ttl)
            .await?;

        tracing::debug!(target: TRACING_TARGET_TOKENS, %user_id, "Refresh token issued");
        Ok(token)
    }

    /// Issues an access token and a refresh token.
    pub async fn issue_pair(&self, user_id: UserId, fingerprint: &str) -> Result<TokenPair> {
        let access_token = self.issue_access_token(user_id)?;
        let refresh_token = self.issue_refresh_token(user_id, fingerprint).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Resolves a refresh token presented from `fingerprint` to its user.
    ///
    /// Unknown, expired and revoked tokens all yield [`ErrorKind::TokenNotFound`].
    #[tracing::instrument(skip_all, target = TRACING_TARGET_TOKENS)]
    pub async fn validate_refresh_token(&self, token: &str, fingerprint: &str) -> Result<UserId> {
        match self.inner.sessions.lookup(token, fingerprint).await? {
            Some(user_id) => Ok(user_id),
            None => {
                tracing::debug!(target: TRACING_TARGET_TOKENS, "Refresh token not found");
                Err(Error::token_not_found())
            }
        }
    }

    /// Deletes every refresh token of `user_id` bound to `fingerprint`.
    ///
    /// Returns how many were removed; zero is not an error.
    #[tracing::instrument(skip(self, fingerprint), target = TRACING_TARGET_TOKENS)]
    pub async fn revoke_refresh_token(&self, user_id: UserId, fingerprint: &str) -> Result<usize> {
        let revoked = self.inner.sessions.revoke(user_id, fingerprint).await?;
        tracing::debug!(target: TRACING_TARGET_TOKENS, %user_id, revoked, "Refresh tokens revoked");
        Ok(revoked)
    }
}
