//! Error types for SMTP delivery.

use syncauth_core::ErrorKind;
use thiserror::Error;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for SMTP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A sender or recipient address could not be parsed.
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    /// The message could not be assembled.
    #[error("Message error: {0}")]
    Message(#[from] lettre::error::Error),
    /// The SMTP exchange failed.
    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    /// The blocking send task did not complete.
    #[error("Send task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    /// The configuration is unusable.
    #[error("Invalid SMTP configuration: {0}")]
    InvalidConfig(String),
}

impl From<Error> for syncauth_core::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::InvalidConfig(_) => ErrorKind::Internal,
            _ => ErrorKind::DeliveryFailed,
        };

        syncauth_core::Error::new(kind)
            .with_message(err.to_string())
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_errors_are_delivery_failures() {
        let parse = "not an address".parse::<lettre::Address>().unwrap_err();
        let error: syncauth_core::Error = Error::from(parse).into();
        assert_eq!(error.kind(), ErrorKind::DeliveryFailed);
    }

    #[test]
    fn config_errors_are_internal() {
        let error: syncauth_core::Error = Error::InvalidConfig("empty host".into()).into();
        assert_eq!(error.kind(), ErrorKind::Internal);
    }
}
