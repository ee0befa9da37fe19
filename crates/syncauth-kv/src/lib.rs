#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for NATS client operations.
///
/// Use this target for logging client initialization, configuration, and client-level errors.
pub const TRACING_TARGET_CLIENT: &str = "syncauth_kv::client";

/// Tracing target for NATS connection operations.
pub const TRACING_TARGET_CONNECTION: &str = "syncauth_kv::connection";

/// Tracing target for raw key-value operations.
pub const TRACING_TARGET_KV: &str = "syncauth_kv::kv";

/// Tracing target for typed session and code store operations.
pub const TRACING_TARGET_STORE: &str = "syncauth_kv::store";

mod client;
mod error;
pub mod kv;
pub mod store;

pub use client::{KvBackend, KvConfig, NatsClient, NatsConfig};
pub use error::{Error, Result};
pub use kv::{KeyValueStore, MemoryStore, NatsStore};
pub use store::{CodeStore, SessionStore};
