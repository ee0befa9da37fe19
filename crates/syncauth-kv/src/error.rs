//! Error types and utilities for key-value operations.

use std::time::Duration;

use syncauth_core::ErrorKind;

/// Result type for all key-value operations in this crate.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for key-value operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// NATS client/connection errors
    #[error("NATS connection error: {0}")]
    Connection(#[from] async_nats::Error),

    /// Serialization errors when encoding or decoding stored records
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation timeout
    #[error("Operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// A key could not be parsed into its typed form
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// A stored value could not be interpreted
    #[error("Corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// A set or value operation hit an entry of the other type
    #[error("Key '{key}' holds a {found}, expected a {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Revision-checked writes kept losing to concurrent writers
    #[error("Gave up updating '{key}' after {attempts} conflicting writes")]
    KvRevisionConflict { key: String, attempts: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Generic operation error with context
    #[error("KV operation failed: {operation} - {details}")]
    Operation { operation: String, details: String },
}

impl Error {
    /// Create an operation error with context
    pub fn operation(op: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Operation {
            operation: op.into(),
            details: details.into(),
        }
    }

    /// Create an invalid key error
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupt value error
    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a timeout error with the given duration
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { timeout: duration }
    }

    /// Returns the credential-layer error kind this error surfaces as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Serialization(_) | Error::Corrupt { .. } | Error::WrongType { .. } => {
                ErrorKind::Corrupt
            }
            Error::InvalidKey { .. } | Error::InvalidConfig { .. } => ErrorKind::Internal,
            Error::Connection(_)
            | Error::Timeout { .. }
            | Error::KvRevisionConflict { .. }
            | Error::Operation { .. } => ErrorKind::StoreUnavailable,
        }
    }
}

impl From<Error> for syncauth_core::Error {
    fn from(error: Error) -> Self {
        let kind = error.kind();
        syncauth_core::Error::new(kind).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use syncauth_core::ErrorCategory;

    use super::*;

    #[test]
    fn operation_errors_are_store_unavailable() {
        let error: syncauth_core::Error = Error::operation("kv_put", "no responders").into();
        assert_eq!(error.kind(), ErrorKind::StoreUnavailable);
        assert_eq!(error.category(), ErrorCategory::Infrastructure);
    }

    #[test]
    fn corrupt_values_are_corrupt() {
        let error: syncauth_core::Error = Error::corrupt("code:1", "not a number").into();
        assert_eq!(error.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn display_carries_context() {
        let error = Error::KvRevisionConflict {
            key: "tokens:7".into(),
            attempts: 8,
        };
        assert_eq!(
            error.to_string(),
            "Gave up updating 'tokens:7' after 8 conflicting writes"
        );
    }
}
