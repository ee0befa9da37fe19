//! Typed stores layered over a [`KeyValueStore`](crate::KeyValueStore).

mod code_store;
mod session_store;

pub use code_store::CodeStore;
pub use session_store::SessionStore;
