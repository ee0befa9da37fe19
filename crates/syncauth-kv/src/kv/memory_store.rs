//! Process-local key-value backend.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use super::KeyValueStore;
use crate::{Error, Result, TRACING_TARGET_KV};

#[derive(Debug, Clone)]
enum Data {
    Value(String),
    Set(BTreeSet<String>),
}

impl Data {
    fn type_name(&self) -> &'static str {
        match self {
            Data::Value(_) => "value",
            Data::Set(_) => "set",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    data: Data,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory [`KeyValueStore`].
///
/// Expiry is checked on every read against the tokio clock, so tests can
/// advance time with a paused runtime. Expired entries are dropped lazily.
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|entry| entry.is_live(now)).count()
    }

    /// Returns whether the store holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn live_entry<'a>(
    entries: &'a mut HashMap<String, Entry>,
    key: &str,
    now: Instant,
) -> Option<&'a mut Entry> {
    if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let entry = Entry {
            data: Data::Value(value.to_owned()),
            expires_at: Some(Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_owned(), entry);

        tracing::trace!(target: TRACING_TARGET_KV, key, ttl_secs = ttl.as_secs(), "Set value");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, key, now) {
            None => Ok(None),
            Some(Entry {
                data: Data::Value(value),
                ..
            }) => Ok(Some(value.clone())),
            Some(entry) => Err(Error::WrongType {
                key: key.to_owned(),
                expected: "value",
                found: entry.data.type_name(),
            }),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        tracing::trace!(target: TRACING_TARGET_KV, key, "Deleted key");
        Ok(())
    }

    async fn add_to_set(&self, set_key: &str, member: &str) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, set_key, now) {
            Some(Entry {
                data: Data::Set(members),
                ..
            }) => {
                members.insert(member.to_owned());
            }
            Some(entry) => {
                return Err(Error::WrongType {
                    key: set_key.to_owned(),
                    expected: "set",
                    found: entry.data.type_name(),
                });
            }
            None => {
                let members = BTreeSet::from([member.to_owned()]);
                entries.insert(
                    set_key.to_owned(),
                    Entry {
                        data: Data::Set(members),
                        expires_at: None,
                    },
                );
            }
        }

        Ok(())
    }

    async fn members_of(&self, set_key: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, set_key, now) {
            None => Ok(Vec::new()),
            Some(Entry {
                data: Data::Set(members),
                ..
            }) => Ok(members.iter().cloned().collect()),
            Some(entry) => Err(Error::WrongType {
                key: set_key.to_owned(),
                expected: "set",
                found: entry.data.type_name(),
            }),
        }
    }

    async fn remove_from_set(&self, set_key: &str, member: &str) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let emptied = match live_entry(&mut entries, set_key, now) {
            None => false,
            Some(Entry {
                data: Data::Set(members),
                ..
            }) => {
                members.remove(member);
                members.is_empty()
            }
            Some(entry) => {
                return Err(Error::WrongType {
                    key: set_key.to_owned(),
                    expected: "set",
                    found: entry.data.type_name(),
                });
            }
        };

        if emptied {
            entries.remove(set_key);
        }
        Ok(())
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if let Some(entry) = live_entry(&mut entries, key, now) {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_get_delete() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set("k", "v1", TTL).await?;
        store.set("k", "v2", TTL).await?;
        assert_eq!(store.get("k").await?.as_deref(), Some("v2"));

        store.delete("k").await?;
        store.delete("k").await?;
        assert_eq!(store.get("k").await?, None);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn expired_value_is_absent() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set("k", "v", TTL).await?;

        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        assert_eq!(store.get("k").await?.as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("k").await?, None);
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn set_membership() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.add_to_set("s", "b").await?;
        store.add_to_set("s", "a").await?;
        store.add_to_set("s", "a").await?;
        assert_eq!(store.members_of("s").await?, vec!["a", "b"]);

        store.remove_from_set("s", "a").await?;
        store.remove_from_set("s", "missing").await?;
        assert_eq!(store.members_of("s").await?, vec!["b"]);

        store.remove_from_set("s", "b").await?;
        assert!(store.members_of("s").await?.is_empty());
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn set_expiry_applies_to_sets() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.add_to_set("s", "a").await?;
        store.set_expiry("s", TTL).await?;

        store.add_to_set("s", "b").await?;
        tokio::time::advance(TTL).await;
        assert!(store.members_of("s").await?.is_empty());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn set_expiry_extends_value() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::from_secs(10)).await?;
        store.set_expiry("k", TTL).await?;

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.get("k").await?.as_deref(), Some("v"));
        Ok(())
    }

    #[tokio::test]
    async fn set_expiry_on_absent_key_is_noop() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set_expiry("missing", TTL).await?;
        assert_eq!(store.get("missing").await?, None);
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn type_mismatch_is_reported() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.set("k", "v", TTL).await?;
        assert!(matches!(
            store.add_to_set("k", "m").await,
            Err(Error::WrongType { .. })
        ));
        Ok(())
    }
}
