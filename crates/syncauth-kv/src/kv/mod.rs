//! Key-value store contract and backends.
//!
//! This module provides:
//! - `KeyValueStore`: the object-safe contract every backend implements
//! - `MemoryStore` and `NatsStore`: the two backends
//! - `KvKey`: trait for typed keys with a fixed prefix
//! - `KvBucket`: trait for JetStream bucket configuration

mod kv_bucket;
mod kv_key;
mod kv_store;
mod memory_store;
mod nats_store;

pub use kv_bucket::{KvBucket, SessionsBucket};
pub use kv_key::{KvKey, RefreshTokenKey, UserTokensKey, VerificationCodeKey};
pub use kv_store::KeyValueStore;
pub use memory_store::MemoryStore;
pub use nats_store::NatsStore;
