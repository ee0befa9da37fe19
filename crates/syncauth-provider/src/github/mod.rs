//! GitHub OAuth provider.
//!
//! Exchanges an authorization code at the GitHub token endpoint, then reads
//! `/user/emails` and picks the address that is both primary and verified.

mod client;
mod config;
mod error;

pub use client::GitHubClient;
pub use config::GitHubConfig;
pub use error::{Error, Result};

/// Tracing target for GitHub client operations.
pub const TRACING_TARGET: &str = "syncauth_provider::github";

/// Name under which the provider is registered.
pub const PROVIDER_NAME: &str = "github";
