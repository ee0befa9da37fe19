//! Refresh-token reverse lookups and the per-user token index.

use std::sync::Arc;
use std::time::Duration;

use syncauth_core::UserId;

use crate::kv::{KeyValueStore, KvKey, RefreshTokenKey, UserTokensKey};
use crate::{Error, Result, TRACING_TARGET_STORE};

/// Session state for refresh tokens.
///
/// Each refresh token is stored as `refresh:{token}:{fingerprint} -> user id`
/// with its own TTL, and its key is indexed in the set `tokens:{user id}`.
/// The index only serves revocation; stale members whose entry has already
/// expired are skipped.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates a session store over the shared key-value store.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Persists a refresh token for `user_id` bound to `fingerprint`.
    ///
    /// Writes the lookup entry, indexes it and pushes the index expiry out to
    /// `ttl`. The three writes are independent; a failure part-way leaves at
    /// most a dangling index member.
    #[tracing::instrument(skip(self, token, fingerprint), target = TRACING_TARGET_STORE)]
    pub async fn insert(
        &self,
        user_id: UserId,
        token: &str,
        fingerprint: &str,
        ttl: Duration,
    ) -> Result<()> {
        let key = RefreshTokenKey::new(token, fingerprint).to_string();
        let index = UserTokensKey(user_id).to_string();

        self.kv.set(&key, &user_id.to_string(), ttl).await?;
        self.kv.add_to_set(&index, &key).await?;
        self.kv.set_expiry(&index, ttl).await?;

        tracing::debug!(target: TRACING_TARGET_STORE, %user_id, "Refresh token stored");
        Ok(())
    }

    /// Returns the user a refresh token belongs to, `None` when absent or expired.
    #[tracing::instrument(skip(self, token, fingerprint), target = TRACING_TARGET_STORE)]
    pub async fn lookup(&self, token: &str, fingerprint: &str) -> Result<Option<UserId>> {
        let key = RefreshTokenKey::new(token, fingerprint).to_string();
        let Some(value) = self.kv.get(&key).await? else {
            return Ok(None);
        };

        let user_id = value.parse::<UserId>().map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_STORE,
                error = %e,
                "Refresh token entry does not hold a user id"
            );
            Error::corrupt(format!("{}:*", RefreshTokenKey::PREFIX), e.to_string())
        })?;
        Ok(Some(user_id))
    }

    /// Removes every refresh token of `user_id` bound to `fingerprint`.
    ///
    /// Returns the number of index members removed. No match is not an error.
    #[tracing::instrument(skip(self, fingerprint), target = TRACING_TARGET_STORE)]
    pub async fn revoke(&self, user_id: UserId, fingerprint: &str) -> Result<usize> {
        let index = UserTokensKey(user_id).to_string();
        let members = self.kv.members_of(&index).await?;

        let mut revoked = 0;
        for member in members {
            let key = match member.parse::<RefreshTokenKey>() {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(
                        target: TRACING_TARGET_STORE,
                        %user_id,
                        error = %e,
                        "Skipping unparseable token index member"
                    );
                    continue;
                }
            };
            if !key.matches_fingerprint(fingerprint) {
                continue;
            }

            self.kv.delete(&member).await?;
            self.kv.remove_from_set(&index, &member).await?;
            revoked += 1;
        }

        tracing::debug!(target: TRACING_TARGET_STORE, %user_id, revoked, "Refresh tokens revoked");
        Ok(revoked)
    }
}
