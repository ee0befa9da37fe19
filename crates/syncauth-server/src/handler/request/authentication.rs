//! Authentication request types.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for sign-up and login.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    /// Email address of the account.
    #[validate(email, length(max = 254))]
    pub email: String,
    /// Password of the account.
    #[validate(length(min = 8, max = 64))]
    pub password: String,
    /// Identifier of the calling device.
    #[validate(length(min = 1, max = 256))]
    pub fingerprint: String,
}

/// Request payload for logout.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[validate(length(min = 1))]
    pub access_token: String,
    #[validate(length(min = 1, max = 256))]
    pub fingerprint: String,
}

/// Request payload for an OAuth sign-in.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OAuthRequest {
    /// Authorization code returned by the provider.
    #[validate(length(min = 1, max = 512))]
    pub code: String,
    #[validate(length(min = 1, max = 256))]
    pub fingerprint: String,
}
