//! The key-value contract shared by all backends.

use std::time::Duration;

use crate::Result;

/// Minimal key-value contract for session and code state.
///
/// Single-key operations are atomic. Sequences of calls are not: callers that
/// write an entry and then index it in a set must tolerate the index lagging
/// behind or pointing at entries that have already expired.
///
/// An entry past its expiry is indistinguishable from an absent entry.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous entry, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Returns the value under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Adds `member` to the set under `set_key`, creating the set if needed.
    ///
    /// An existing set keeps its expiry.
    async fn add_to_set(&self, set_key: &str, member: &str) -> Result<()>;

    /// Returns the members of the set under `set_key`, empty when absent or expired.
    async fn members_of(&self, set_key: &str) -> Result<Vec<String>>;

    /// Removes `member` from the set under `set_key`.
    async fn remove_from_set(&self, set_key: &str, member: &str) -> Result<()>;

    /// Resets the expiry of an existing entry. Absent keys are left absent.
    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<()>;
}
