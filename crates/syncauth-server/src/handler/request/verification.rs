//! Email verification request types.

use serde::{Deserialize, Serialize};

/// Request payload for confirming a verification code.
///
/// Out-of-range codes are accepted here and simply never match.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCodeRequest {
    pub code: u32,
}
