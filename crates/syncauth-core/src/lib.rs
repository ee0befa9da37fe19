#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for user store operations.
pub const TRACING_TARGET_USERS: &str = "syncauth_core::users";

mod error;
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;
mod user;

pub use error::{BoxedError, Error, ErrorCategory, ErrorKind, Result};
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use mock::MemoryUserStore;
pub use user::{User, UserId, UserStore, normalize_email};
