//! One-time verification codes.

use std::sync::Arc;
use std::time::Duration;

use syncauth_core::UserId;

use crate::kv::{KeyValueStore, VerificationCodeKey};
use crate::{Error, Result, TRACING_TARGET_STORE};

/// Per-user verification code storage.
///
/// At most one code exists per user; storing a new one replaces the old.
#[derive(Clone)]
pub struct CodeStore {
    kv: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeStore").finish_non_exhaustive()
    }
}

impl CodeStore {
    /// Creates a code store over the shared key-value store.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Stores `code` for `user_id`, replacing any pending code.
    #[tracing::instrument(skip(self, code), target = TRACING_TARGET_STORE)]
    pub async fn put(&self, user_id: UserId, code: u32, ttl: Duration) -> Result<()> {
        let key = VerificationCodeKey(user_id).to_string();
        self.kv.set(&key, &code.to_string(), ttl).await
    }

    /// Returns the pending code for `user_id`, `None` when absent or expired.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_STORE)]
    pub async fn get(&self, user_id: UserId) -> Result<Option<u32>> {
        let key = VerificationCodeKey(user_id).to_string();
        let Some(value) = self.kv.get(&key).await? else {
            return Ok(None);
        };

        value
            .parse::<u32>()
            .map(Some)
            .map_err(|e| Error::corrupt(key, e.to_string()))
    }

    /// Deletes the pending code for `user_id`.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_STORE)]
    pub async fn remove(&self, user_id: UserId) -> Result<()> {
        let key = VerificationCodeKey(user_id).to_string();
        self.kv.delete(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    const TTL: Duration = Duration::from_secs(120);

    #[tokio::test]
    async fn put_get_remove() -> anyhow::Result<()> {
        let memory = Arc::new(MemoryStore::new());
        let codes = CodeStore::new(memory);
        let user = UserId::new(3);

        assert_eq!(codes.get(user).await?, None);
        codes.put(user, 123_456, TTL).await?;
        codes.put(user, 654_321, TTL).await?;
        assert_eq!(codes.get(user).await?, Some(654_321));

        codes.remove(user).await?;
        assert_eq!(codes.get(user).await?, None);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn code_expires() -> anyhow::Result<()> {
        let codes = CodeStore::new(Arc::new(MemoryStore::new()));
        let user = UserId::new(3);
        codes.put(user, 123_456, TTL).await?;

        tokio::time::advance(TTL).await;
        assert_eq!(codes.get(user).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn codes_and_sessions_share_a_store_without_clashing() -> anyhow::Result<()> {
        let memory = Arc::new(MemoryStore::new());
        let codes = CodeStore::new(memory.clone());
        let sessions = crate::SessionStore::new(memory);
        let user = UserId::new(3);

        sessions.insert(user, "tok", "device", TTL).await?;
        codes.put(user, 111_111, TTL).await?;
        assert_eq!(codes.get(user).await?, Some(111_111));
        assert_eq!(sessions.lookup("tok", "device").await?, Some(user));
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_code_is_reported() -> anyhow::Result<()> {
        let memory = Arc::new(MemoryStore::new());
        memory.set("code:3", "abc", TTL).await?;

        let codes = CodeStore::new(memory);
        assert!(matches!(
            codes.get(UserId::new(3)).await,
            Err(Error::Corrupt { .. })
        ));
        Ok(())
    }
}
