//! Email verification response types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::service::ConfirmOutcome;

/// Status reported once a verification code has been sent.
pub const CODE_SENT: &str = "code sent";

/// Acknowledges that a verification code was emailed.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailResponse {
    pub status: String,
    /// Code lifetime in seconds.
    pub code_ttl: u64,
}

impl VerifyEmailResponse {
    /// Creates the response for a code valid for `code_ttl`.
    pub fn sent(code_ttl: Duration) -> Self {
        Self {
            status: CODE_SENT.to_owned(),
            code_ttl: code_ttl.as_secs(),
        }
    }
}

/// Result of a code confirmation.
///
/// Expired and incorrect codes are ordinary outcomes, not errors.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCodeResponse {
    pub success: bool,
    pub message: String,
}

impl From<ConfirmOutcome> for ConfirmCodeResponse {
    fn from(outcome: ConfirmOutcome) -> Self {
        Self {
            success: outcome.is_success(),
            message: outcome.message().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_email_body() -> anyhow::Result<()> {
        let body = serde_json::to_value(VerifyEmailResponse::sent(Duration::from_secs(120)))?;
        assert_eq!(body, serde_json::json!({ "status": "code sent", "codeTtl": 120 }));
        Ok(())
    }

    #[test]
    fn confirm_outcomes() {
        let response = ConfirmCodeResponse::from(ConfirmOutcome::Confirmed);
        assert!(response.success);
        assert_eq!(response.message, "Code confirmed");

        let response = ConfirmCodeResponse::from(ConfirmOutcome::Incorrect);
        assert!(!response.success);
        assert_eq!(response.message, "Incorrect code");
    }
}
