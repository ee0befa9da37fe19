//! In-memory user store for testing.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! syncauth-core = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use jiff::Timestamp;
use tokio::sync::RwLock;

use crate::{Error, ErrorKind, Result, TRACING_TARGET_USERS, User, UserId, UserStore};

#[derive(Debug, Default)]
struct MemoryUserStoreInner {
    users: HashMap<UserId, User>,
    next_id: i64,
}

/// [`UserStore`] backed by a process-local map.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<RwLock<MemoryUserStoreInner>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Returns whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.users.is_empty()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, email: &str, password_hash: Option<String>) -> Result<UserId> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|user| user.email == email) {
            return Err(Error::new(ErrorKind::UserExists));
        }

        inner.next_id += 1;
        let id = UserId::new(inner.next_id);
        let now = Timestamp::now();
        inner.users.insert(
            id,
            User {
                id,
                email: email.to_owned(),
                password_hash,
                email_verified: false,
                created_at: now,
                updated_at: now,
            },
        );

        tracing::debug!(target: TRACING_TARGET_USERS, user_id = %id, "User created");
        Ok(id)
    }

    async fn user_by_email(&self, email: &str) -> Result<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::UserNotFound))
    }

    async fn user_by_id(&self, user_id: UserId) -> Result<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::UserNotFound))
    }

    async fn mark_email_verified(&self, user_id: UserId) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| Error::new(ErrorKind::UserNotFound))?;

        user.email_verified = true;
        user.updated_at = Timestamp::now();
        Ok(())
    }
}
