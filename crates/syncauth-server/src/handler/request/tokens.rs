//! Token request types.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for exchanging a refresh token.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, max = 256))]
    pub refresh_token: String,
    #[validate(length(min = 1, max = 256))]
    pub fingerprint: String,
}

/// Request payload for validating an access token.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTokenRequest {
    #[validate(length(min = 1))]
    pub access_token: String,
}
