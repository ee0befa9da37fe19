//! Credential error to HTTP error conversion.
//!
//! Every authentication failure collapses into the same `401` so clients
//! cannot tell an unknown account from a wrong password or an expired token.
//! Infrastructure failures are logged in full and answered with a bare `500`.

use syncauth_core::{ErrorCategory, ErrorKind as CoreErrorKind};

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for credential error conversions.
const TRACING_TARGET: &str = "syncauth_server::handler::error";

impl From<syncauth_core::Error> for HttpError<'static> {
    fn from(error: syncauth_core::Error) -> Self {
        match error.category() {
            ErrorCategory::Validation => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Rejected invalid input"
                );

                let message = match error.kind() {
                    CoreErrorKind::UnknownProvider => {
                        error.message.unwrap_or_else(|| "Unknown OAuth provider".to_owned())
                    }
                    _ => error.message.unwrap_or_else(|| "Invalid input".to_owned()),
                };
                ErrorKind::BadRequest.with_message(message)
            }
            ErrorCategory::Authentication => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error_kind = error.kind_str(),
                    "Authentication failed"
                );
                ErrorKind::Unauthorized.into_error()
            }
            ErrorCategory::Conflict => ErrorKind::Conflict
                .with_message("An account with this email already exists")
                .with_resource("account"),
            ErrorCategory::NotFound => ErrorKind::NotFound
                .with_message("Account not found")
                .with_resource("account"),
            ErrorCategory::Infrastructure => {
                let source = std::error::Error::source(&error).map(ToString::to_string);
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = error.kind_str(),
                    source = source.as_deref(),
                    "Credential operation failed"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}
