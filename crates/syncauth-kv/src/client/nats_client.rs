//! NATS client wrapper and connection management.
//!
//! The underlying `async-nats` client multiplexes every operation over a single
//! TCP connection and is `Arc`-wrapped internally, so cloning a [`NatsClient`]
//! never opens a new connection.

use std::time::Duration;

use async_nats::{ConnectOptions, jetstream};
use tokio::time::timeout;

use super::nats_config::NatsConfig;
use crate::kv::{KvBucket, NatsStore};
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// NATS client wrapper with connection management.
///
/// This wrapper is cheaply cloneable and thread-safe. The JetStream context
/// keeps the underlying connection alive.
#[derive(Debug, Clone)]
pub struct NatsClient {
    jetstream: jetstream::Context,
}

/// Upper bound on the delay between reconnection attempts.
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Exponential backoff for the `attempts`-th reconnection, capped at [`MAX_RECONNECT_DELAY`].
fn reconnect_delay(base: Duration, attempts: usize) -> Duration {
    let factor = 2_u32.saturating_pow(attempts.min(32) as u32);
    base.saturating_mul(factor).min(MAX_RECONNECT_DELAY)
}

impl NatsClient {
    /// Create a new NATS client and connect
    #[tracing::instrument(skip(config), target = TRACING_TARGET_CONNECTION)]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            servers = %config.nats_url,
            "Connecting to NATS servers"
        );

        let mut connect_opts = ConnectOptions::new()
            .name(config.name())
            .ping_interval(config.ping_interval());

        if let Some(token) = config.nats_token.clone() {
            connect_opts = connect_opts.token(token);
        }

        if let Some(max_reconnects) = config.max_reconnects_option() {
            connect_opts = connect_opts.max_reconnects(max_reconnects);
        }
        let base_delay = config.reconnect_delay();
        connect_opts = connect_opts
            .reconnect_delay_callback(move |attempts| reconnect_delay(base_delay, attempts));

        let connect_timeout = config.connect_timeout();
        connect_opts = connect_opts.connection_timeout(connect_timeout);

        let client = timeout(
            connect_timeout,
            async_nats::connect_with_options(config.nats_url.as_str(), connect_opts),
        )
        .await
        .map_err(|_| Error::timeout(connect_timeout))?
        .map_err(|e| Error::Connection(Box::new(e)))?;

        let jetstream = jetstream::new(client.clone());

        let server_info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server_host = %server_info.host,
            server_version = %server_info.version,
            server_id = %server_info.server_id,
            "Successfully connected to NATS"
        );

        Ok(Self { jetstream })
    }

    /// Get or create the KV bucket `B` and wrap it as a [`NatsStore`].
    ///
    /// `max_age` bounds how long an untouched key survives in the bucket;
    /// per-entry expiry is enforced on read regardless.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn key_value_store<B>(&self, max_age: Option<Duration>) -> Result<NatsStore>
    where
        B: KvBucket,
    {
        NatsStore::open::<B>(&self.jetstream, max_age.or(B::TTL)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconnect_delay_doubles_until_capped() {
        let base = Duration::from_secs(2);
        assert_eq!(reconnect_delay(base, 0), Duration::from_secs(2));
        assert_eq!(reconnect_delay(base, 1), Duration::from_secs(4));
        assert_eq!(reconnect_delay(base, 3), Duration::from_secs(16));
        assert_eq!(reconnect_delay(base, 4), MAX_RECONNECT_DELAY);
        assert_eq!(reconnect_delay(base, usize::MAX), MAX_RECONNECT_DELAY);
    }
}
