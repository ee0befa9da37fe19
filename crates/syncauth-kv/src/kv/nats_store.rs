//! NATS JetStream key-value backend.

use std::collections::BTreeSet;
use std::time::Duration;

use async_nats::jetstream::{self, kv};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use super::{KeyValueStore, KvBucket};
use crate::{Error, Result, TRACING_TARGET_KV};

/// Upper bound on revision-checked write attempts for a single set update.
const MAX_CAS_ATTEMPTS: usize = 8;

/// Stored representation of an entry.
///
/// JetStream only ages out whole keys by bucket policy, so each record
/// carries its own expiry which is enforced on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record {
    Value {
        value: String,
        expires_at: Option<Timestamp>,
    },
    Set {
        members: BTreeSet<String>,
        expires_at: Option<Timestamp>,
    },
}

impl Record {
    fn expires_at(&self) -> Option<Timestamp> {
        match self {
            Record::Value { expires_at, .. } | Record::Set { expires_at, .. } => *expires_at,
        }
    }

    fn is_live(&self, now: Timestamp) -> bool {
        self.expires_at().is_none_or(|at| at > now)
    }

    fn type_name(&self) -> &'static str {
        match self {
            Record::Value { .. } => "value",
            Record::Set { .. } => "set",
        }
    }
}

fn expiry_after(ttl: Duration) -> Result<Timestamp> {
    let ttl = SignedDuration::try_from(ttl)
        .map_err(|e| Error::operation("kv_expiry", e.to_string()))?;
    Timestamp::now()
        .checked_add(ttl)
        .map_err(|e| Error::operation("kv_expiry", e.to_string()))
}

/// Encodes an arbitrary key into the JetStream key alphabet.
fn encode_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key.as_bytes())
}

/// [`KeyValueStore`] backed by a NATS JetStream KV bucket.
///
/// Keys are base64url-encoded so fingerprints may contain any character.
/// Set updates read the current revision and write back conditionally,
/// retrying a bounded number of times when another writer got there first.
#[derive(Clone)]
pub struct NatsStore {
    store: kv::Store,
    bucket: &'static str,
}

impl std::fmt::Debug for NatsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsStore")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl NatsStore {
    /// Create or get the KV bucket `B`.
    #[tracing::instrument(skip(jetstream), target = TRACING_TARGET_KV)]
    pub(crate) async fn open<B>(
        jetstream: &jetstream::Context,
        max_age: Option<Duration>,
    ) -> Result<Self>
    where
        B: KvBucket,
    {
        let store = match jetstream.get_key_value(B::NAME).await {
            Ok(store) => {
                tracing::debug!(
                    target: TRACING_TARGET_KV,
                    bucket = %B::NAME,
                    "Using existing KV bucket"
                );
                store
            }
            Err(_) => {
                tracing::debug!(
                    target: TRACING_TARGET_KV,
                    bucket = %B::NAME,
                    max_age_secs = max_age.map(|age| age.as_secs()),
                    "Creating new KV bucket"
                );
                let config = kv::Config {
                    bucket: B::NAME.to_string(),
                    description: B::DESCRIPTION.to_string(),
                    max_age: max_age.unwrap_or_default(),
                    history: 1,
                    ..Default::default()
                };
                jetstream
                    .create_key_value(config)
                    .await
                    .map_err(|e| Error::operation("kv_create", e.to_string()))?
            }
        };

        Ok(Self {
            store,
            bucket: B::NAME,
        })
    }

    /// Returns the bucket name.
    #[inline]
    pub fn bucket_name(&self) -> &'static str {
        self.bucket
    }

    /// Reads the live record under an encoded key with its revision.
    async fn read(&self, encoded: &str) -> Result<Option<(Record, u64)>> {
        let entry = self
            .store
            .entry(encoded)
            .await
            .map_err(|e| Error::operation("kv_get", e.to_string()))?;

        let Some(entry) = entry else {
            return Ok(None);
        };
        if !matches!(entry.operation, kv::Operation::Put) {
            return Ok(None);
        }

        let record: Record = serde_json::from_slice(&entry.value)?;
        if !record.is_live(Timestamp::now()) {
            return Ok(None);
        }
        Ok(Some((record, entry.revision)))
    }

    /// Applies `apply` to the current record under `key` with revision checks.
    ///
    /// `apply` returns `Ok(None)` when no write is needed.
    async fn modify<F>(&self, key: &str, mut apply: F) -> Result<()>
    where
        F: FnMut(Option<Record>) -> Result<Option<Record>> + Send,
    {
        let encoded = encode_key(key);

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let entry = self
                .store
                .entry(&encoded)
                .await
                .map_err(|e| Error::operation("kv_get", e.to_string()))?;

            let (current, revision) = match entry {
                Some(entry) if matches!(entry.operation, kv::Operation::Put) => {
                    let record: Record = serde_json::from_slice(&entry.value)?;
                    let live = record.is_live(Timestamp::now()).then_some(record);
                    (live, Some(entry.revision))
                }
                Some(entry) => (None, Some(entry.revision)),
                None => (None, None),
            };

            let Some(next) = apply(current)? else {
                return Ok(());
            };
            let payload = serde_json::to_vec(&next)?;

            let written = match revision {
                Some(revision) => self
                    .store
                    .update(&encoded, payload.into(), revision)
                    .await
                    .map_err(|e| match e.kind() {
                        kv::UpdateErrorKind::WrongLastRevision => None,
                        _ => Some(Error::operation("kv_update", e.to_string())),
                    }),
                None => self
                    .store
                    .create(&encoded, payload.into())
                    .await
                    .map_err(|e| match e.kind() {
                        kv::CreateErrorKind::AlreadyExists => None,
                        _ => Some(Error::operation("kv_create", e.to_string())),
                    }),
            };

            match written {
                Ok(_) => return Ok(()),
                Err(Some(error)) => return Err(error),
                Err(None) => {
                    tracing::debug!(
                        target: TRACING_TARGET_KV,
                        key,
                        attempt,
                        "Concurrent write detected, retrying"
                    );
                }
            }
        }

        tracing::warn!(target: TRACING_TARGET_KV, key, "Giving up on contended key");
        Err(Error::KvRevisionConflict {
            key: key.to_owned(),
            attempts: MAX_CAS_ATTEMPTS,
        })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for NatsStore {
    #[tracing::instrument(skip(self, value), target = TRACING_TARGET_KV)]
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let record = Record::Value {
            value: value.to_owned(),
            expires_at: Some(expiry_after(ttl)?),
        };
        let payload = serde_json::to_vec(&record)?;
        let revision = self
            .store
            .put(encode_key(key), payload.into())
            .await
            .map_err(|e| Error::operation("kv_put", e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET_KV,
            key,
            revision,
            ttl_secs = ttl.as_secs(),
            "Put value to KV store"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_KV)]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.read(&encode_key(key)).await? {
            None => Ok(None),
            Some((Record::Value { value, .. }, _)) => Ok(Some(value)),
            Some((record, _)) => Err(Error::WrongType {
                key: key.to_owned(),
                expected: "value",
                found: record.type_name(),
            }),
        }
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_KV)]
    async fn delete(&self, key: &str) -> Result<()> {
        self.store
            .purge(encode_key(key))
            .await
            .map_err(|e| Error::operation("kv_delete", e.to_string()))?;

        tracing::debug!(target: TRACING_TARGET_KV, key, "Deleted key from KV store");
        Ok(())
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_KV)]
    async fn add_to_set(&self, set_key: &str, member: &str) -> Result<()> {
        self.modify(set_key, |current| match current {
            None => Ok(Some(Record::Set {
                members: BTreeSet::from([member.to_owned()]),
                expires_at: None,
            })),
            Some(Record::Set {
                mut members,
                expires_at,
            }) => Ok(members
                .insert(member.to_owned())
                .then_some(Record::Set {
                    members,
                    expires_at,
                })),
            Some(record) => Err(Error::WrongType {
                key: set_key.to_owned(),
                expected: "set",
                found: record.type_name(),
            }),
        })
        .await
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_KV)]
    async fn members_of(&self, set_key: &str) -> Result<Vec<String>> {
        match self.read(&encode_key(set_key)).await? {
            None => Ok(Vec::new()),
            Some((Record::Set { members, .. }, _)) => Ok(members.into_iter().collect()),
            Some((record, _)) => Err(Error::WrongType {
                key: set_key.to_owned(),
                expected: "set",
                found: record.type_name(),
            }),
        }
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_KV)]
    async fn remove_from_set(&self, set_key: &str, member: &str) -> Result<()> {
        self.modify(set_key, |current| match current {
            None => Ok(None),
            Some(Record::Set {
                mut members,
                expires_at,
            }) => Ok(members.remove(member).then_some(Record::Set {
                members,
                expires_at,
            })),
            Some(record) => Err(Error::WrongType {
                key: set_key.to_owned(),
                expected: "set",
                found: record.type_name(),
            }),
        })
        .await
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_KV)]
    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<()> {
        let expires_at = Some(expiry_after(ttl)?);
        self.modify(key, |current| {
            Ok(current.map(|record| match record {
                Record::Value { value, .. } => Record::Value { value, expires_at },
                Record::Set { members, .. } => Record::Set {
                    members,
                    expires_at,
                },
            }))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_keys_use_jetstream_alphabet() {
        let encoded = encode_key("refresh:tok+/=:fp with spaces:and:colons");
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(encode_key("a:b"), encode_key("a:c"));
    }

    #[test]
    fn record_layout() -> anyhow::Result<()> {
        let record = Record::Value {
            value: "42".into(),
            expires_at: None,
        };
        let json = serde_json::to_value(&record)?;
        assert_eq!(
            json,
            serde_json::json!({ "type": "value", "value": "42", "expires_at": null })
        );
        Ok(())
    }

    #[test]
    fn expired_record_is_not_live() -> anyhow::Result<()> {
        let now = Timestamp::now();
        let past = now.checked_sub(SignedDuration::from_secs(1))?;
        let record = Record::Set {
            members: BTreeSet::new(),
            expires_at: Some(past),
        };
        assert!(!record.is_live(now));

        let open_ended = Record::Set {
            members: BTreeSet::new(),
            expires_at: None,
        };
        assert!(open_ended.is_live(now));
        Ok(())
    }
}
