//! Error types for the GitHub provider.

use syncauth_core::ErrorKind;
use thiserror::Error;

/// Result type alias for GitHub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for GitHub operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// A configured endpoint is not a valid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// The token endpoint rejected the authorization code.
    #[error("Token exchange rejected: {error}")]
    Exchange {
        error: String,
        description: Option<String>,
    },
    /// The token endpoint answered without an access token.
    #[error("Token response did not contain an access token")]
    MissingAccessToken,
    /// The account has no primary, verified email address.
    #[error("No primary verified email on the account")]
    NoVerifiedEmail,
    /// A required setting is missing.
    #[error("GitHub provider is not configured: {0} is missing")]
    NotConfigured(&'static str),
}

impl From<Error> for syncauth_core::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::Url(_) | Error::NotConfigured(_) => ErrorKind::Internal,
            _ => ErrorKind::ProviderFailed,
        };

        syncauth_core::Error::new(kind)
            .with_message(err.to_string())
            .with_source(err)
    }
}
