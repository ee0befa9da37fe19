//! Key-value bucket configuration traits.

use std::time::Duration;

/// Marker trait for KV bucket configuration.
pub trait KvBucket: Clone + Send + Sync + 'static {
    /// Bucket name used in NATS KV.
    const NAME: &'static str;

    /// Human-readable description for the bucket.
    const DESCRIPTION: &'static str;

    /// Default maximum age for entries in this bucket.
    /// Returns `None` for buckets where entries should not expire.
    const TTL: Option<Duration>;
}

/// Bucket shared by refresh-token lookups, per-user token sets and verification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionsBucket;

impl KvBucket for SessionsBucket {
    const NAME: &'static str = "syncauth_sessions";
    const DESCRIPTION: &'static str = "Refresh token sessions and verification codes";
    const TTL: Option<Duration> = None;
}
