//! Backend selection for the shared key-value store.

use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use super::{NatsClient, NatsConfig};
use crate::kv::{KeyValueStore, MemoryStore, SessionsBucket};
use crate::{Result, TRACING_TARGET_CLIENT};

/// Which key-value backend holds sessions and verification codes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum KvBackend {
    /// Process-local store. State is lost on restart and not shared between nodes.
    Memory,
    /// NATS JetStream key-value bucket.
    #[default]
    Nats,
}

/// Key-value store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct KvConfig {
    /// Backend holding sessions and verification codes
    #[cfg_attr(
        feature = "config",
        arg(long = "kv-backend", env = "KV_BACKEND", value_enum, default_value_t = KvBackend::Nats)
    )]
    pub kv_backend: KvBackend,

    /// NATS connection settings, used by the `nats` backend.
    #[cfg_attr(feature = "config", command(flatten))]
    pub nats: NatsConfig,
}

impl KvConfig {
    /// Creates an in-memory configuration.
    pub fn memory() -> Self {
        Self {
            kv_backend: KvBackend::Memory,
            nats: NatsConfig::default(),
        }
    }

    /// Validates the settings of the selected backend.
    pub fn validate(&self) -> Result<()> {
        match self.kv_backend {
            KvBackend::Memory => Ok(()),
            KvBackend::Nats => self.nats.validate(),
        }
    }

    /// Connects the selected backend.
    ///
    /// `max_age` is the longest TTL any entry will be written with.
    pub async fn connect(&self, max_age: Option<Duration>) -> Result<Arc<dyn KeyValueStore>> {
        let store: Arc<dyn KeyValueStore> = match self.kv_backend {
            KvBackend::Memory => {
                tracing::warn!(
                    target: TRACING_TARGET_CLIENT,
                    "Using in-memory key-value store, sessions will not survive restarts"
                );
                Arc::new(MemoryStore::new())
            }
            KvBackend::Nats => {
                let client = NatsClient::connect(self.nats.clone()).await?;
                Arc::new(client.key_value_store::<SessionsBucket>(max_age).await?)
            }
        };

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nats_is_default_backend() {
        assert_eq!(KvConfig::default().kv_backend, KvBackend::Nats);
    }

    #[test]
    fn memory_backend_skips_nats_validation() {
        let mut config = KvConfig::memory();
        config.nats = NatsConfig::new("not-a-url");
        assert!(config.validate().is_ok());

        config.kv_backend = KvBackend::Nats;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn memory_backend_connects_without_network() -> anyhow::Result<()> {
        let store = KvConfig::memory().connect(None).await?;
        store.set("k", "v", Duration::from_secs(5)).await?;
        assert_eq!(store.get("k").await?.as_deref(), Some("v"));
        Ok(())
    }
}
