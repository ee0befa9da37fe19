#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for outbound email delivery.
pub const TRACING_TARGET_EMAIL: &str = "syncauth_provider::email";

/// Tracing target for OAuth provider calls.
pub const TRACING_TARGET_OAUTH: &str = "syncauth_provider::oauth";

mod email;
mod oauth;

#[cfg(feature = "github")]
#[cfg_attr(docsrs, doc(cfg(feature = "github")))]
pub mod github;
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod mock;
#[cfg(feature = "smtp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smtp")))]
pub mod smtp;

pub use email::{EmailMessage, EmailProvider, EmailService};
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub use mock::{MockMailbox, MockOAuthProvider};
pub use oauth::{OAuthProvider, OAuthRegistry, OAuthService};
