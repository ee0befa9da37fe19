//! NATS client connection management and backend configuration.

mod kv_config;
mod nats_client;
mod nats_config;

pub use kv_config::{KvBackend, KvConfig};
pub use nats_client::NatsClient;
pub use nats_config::NatsConfig;
