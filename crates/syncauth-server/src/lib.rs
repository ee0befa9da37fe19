#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for token issuance and validation.
pub const TRACING_TARGET_TOKENS: &str = "syncauth_server::service::tokens";

/// Tracing target for verification code handling.
pub const TRACING_TARGET_VERIFICATION: &str = "syncauth_server::service::verification";

/// Tracing target for password hashing.
pub const TRACING_TARGET_HASHER: &str = "syncauth_server::service::hasher";

/// Tracing target for the credential orchestration layer.
pub const TRACING_TARGET_CREDENTIALS: &str = "syncauth_server::service::credentials";

/// Tracing target for HTTP handlers and extractors.
pub const TRACING_TARGET_HANDLER: &str = "syncauth_server::handler";

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;
