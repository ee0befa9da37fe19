//! Request extractors with [`Error`](crate::handler::Error) rejections.
//!
//! - [`Json`]: JSON body with trimmed, client-friendly error messages.
//! - [`ValidateJson`]: [`Json`] followed by `validator` checks.
//! - [`BearerToken`]: raw access token from the `Authorization` header.

mod bearer;
mod json;
mod validated_json;

pub use crate::extract::bearer::BearerToken;
pub use crate::extract::json::Json;
pub use crate::extract::validated_json::ValidateJson;
