//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// This type is commonly used as a source error in structured error types,
/// providing a way to wrap any error that implements the standard `Error` trait
/// while maintaining Send and Sync bounds for multi-threaded contexts.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse grouping of [`ErrorKind`]s.
///
/// Transports decide status codes and log levels from the category alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// The caller sent something malformed or unsupported.
    Validation,
    /// The caller could not be authenticated.
    Authentication,
    /// The request collides with existing state.
    Conflict,
    /// A referenced record does not exist.
    NotFound,
    /// A dependency or primitive failed; details stay server-side.
    Infrastructure,
}

/// Kinds of errors raised by credential and session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Input validation failed.
    InvalidInput,
    /// No OAuth provider is registered under the requested name.
    UnknownProvider,

    /// Unknown email, wrong password or passwordless account.
    InvalidCredentials,
    /// Access token signature or structure is invalid.
    InvalidSignature,
    /// Access token is past its expiry.
    Expired,
    /// Refresh token is absent or expired for the given fingerprint.
    TokenNotFound,
    /// Access token subject is not a user identifier.
    MalformedClaims,
    /// Password does not match the stored digest.
    PasswordMismatch,

    /// A user with this email already exists.
    UserExists,

    /// The user record does not exist.
    UserNotFound,

    /// Key-value or relational store could not be reached or written.
    StoreUnavailable,
    /// Outbound email could not be delivered.
    DeliveryFailed,
    /// Access token could not be signed.
    SigningError,
    /// Password could not be hashed.
    HashingError,
    /// Stored data could not be interpreted.
    Corrupt,
    /// OAuth provider rejected or failed the exchange.
    ProviderFailed,
    /// Any other internal failure.
    Internal,
}

impl ErrorKind {
    /// Returns the category this kind belongs to.
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::InvalidInput | Self::UnknownProvider => ErrorCategory::Validation,
            Self::InvalidCredentials
            | Self::InvalidSignature
            | Self::Expired
            | Self::TokenNotFound
            | Self::MalformedClaims
            | Self::PasswordMismatch => ErrorCategory::Authentication,
            Self::UserExists => ErrorCategory::Conflict,
            Self::UserNotFound => ErrorCategory::NotFound,
            Self::StoreUnavailable
            | Self::DeliveryFailed
            | Self::SigningError
            | Self::HashingError
            | Self::Corrupt
            | Self::ProviderFailed
            | Self::Internal => ErrorCategory::Infrastructure,
        }
    }

    /// Converts this kind into an [`Error`].
    #[inline]
    pub fn into_error(self) -> Error {
        Error::new(self)
    }
}

/// A structured error type for syncauth operations.
#[derive(Debug, Error)]
#[error("{kind:?}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Adds an already boxed source error to this error.
    pub fn with_boxed_source(mut self, source: BoxedError) -> Self {
        self.source = Some(source);
        self
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new invalid credentials error.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials)
    }

    /// Creates a new token not found error.
    pub fn token_not_found() -> Self {
        Self::new(ErrorKind::TokenNotFound)
    }

    /// Creates a new store unavailable error.
    pub fn store_unavailable() -> Self {
        Self::new(ErrorKind::StoreUnavailable)
    }

    /// Creates a new delivery failed error.
    pub fn delivery_failed() -> Self {
        Self::new(ErrorKind::DeliveryFailed)
    }

    /// Creates a new provider failed error.
    pub fn provider_failed() -> Self {
        Self::new(ErrorKind::ProviderFailed)
    }

    /// Creates a new internal error.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns the category of the error kind.
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;

    #[test]
    fn kind_str_is_snake_case() {
        let error = Error::new(ErrorKind::TokenNotFound);
        assert_eq!(error.kind_str(), "token_not_found");
        assert_eq!(ErrorKind::InvalidSignature.as_ref(), "invalid_signature");
    }

    #[test]
    fn display_includes_message() {
        let error = Error::store_unavailable().with_message("bucket missing");
        assert_eq!(error.to_string(), "StoreUnavailable: bucket missing");
        assert_eq!(Error::internal().to_string(), "Internal");
    }

    #[test]
    fn source_is_preserved() {
        let error = Error::internal().with_source(io::Error::other("disk"));
        let source = error.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("disk"));
    }

    #[test]
    fn authentication_kinds_share_category() {
        for kind in [
            ErrorKind::InvalidCredentials,
            ErrorKind::InvalidSignature,
            ErrorKind::Expired,
            ErrorKind::TokenNotFound,
            ErrorKind::MalformedClaims,
        ] {
            assert_eq!(kind.category(), ErrorCategory::Authentication);
        }
    }

    #[test]
    fn infrastructure_category() {
        assert_eq!(
            ErrorKind::Corrupt.category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            Error::from(ErrorKind::UserExists).category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            ErrorKind::UnknownProvider.category(),
            ErrorCategory::Validation
        );
    }
}
