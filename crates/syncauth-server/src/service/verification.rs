//! One-time email verification codes.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use syncauth_core::{Result, UserId};
use syncauth_kv::CodeStore;
use syncauth_provider::{EmailMessage, EmailService};

use crate::TRACING_TARGET_VERIFICATION;
use crate::service::config::humanize_ttl;

/// Smallest code that can be issued.
pub const MIN_CODE: u32 = 100_000;

/// Largest code that can be issued.
pub const MAX_CODE: u32 = 999_999;

/// Subject line of the verification email.
pub const EMAIL_SUBJECT: &str = "Email Verification Code";

/// Result of comparing a submitted code with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmOutcome {
    /// The code matched and has been consumed.
    Confirmed,
    /// No code is pending, either never issued, already used, or timed out.
    Expired,
    /// A code is pending but the submission differs; it stays pending.
    Incorrect,
}

impl ConfirmOutcome {
    /// Returns whether the code was accepted.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// Returns the client-facing message.
    pub fn message(self) -> &'static str {
        match self {
            Self::Confirmed => "Code confirmed",
            Self::Expired => "Code expired",
            Self::Incorrect => "Incorrect code",
        }
    }
}

impl fmt::Display for ConfirmOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Issues, delivers and adjudicates verification codes.
#[derive(Clone)]
pub struct VerificationManager {
    codes: CodeStore,
    email: EmailService,
    code_ttl: Duration,
}

impl fmt::Debug for VerificationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationManager")
            .field("code_ttl", &self.code_ttl)
            .finish_non_exhaustive()
    }
}

impl VerificationManager {
    /// Creates a manager storing codes in `codes` and delivering them through `email`.
    pub fn new(codes: CodeStore, email: EmailService, code_ttl: Duration) -> Self {
        Self {
            codes,
            email,
            code_ttl,
        }
    }

    /// Returns the code lifetime.
    #[inline]
    pub fn code_ttl(&self) -> Duration {
        self.code_ttl
    }

    /// Generates a fresh code for `user_id`, replacing any pending one.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_VERIFICATION)]
    pub async fn issue_code(&self, user_id: UserId) -> Result<u32> {
        let code = rand::random_range(MIN_CODE..=MAX_CODE);
        self.codes.put(user_id, code, self.code_ttl).await?;

        tracing::debug!(
            target: TRACING_TARGET_VERIFICATION,
            %user_id,
            ttl_secs = self.code_ttl.as_secs(),
            "Verification code issued"
        );
        Ok(code)
    }

    /// Emails `code` to `email`.
    ///
    /// A delivery failure leaves the stored code untouched.
    pub async fn send_code(&self, email: &str, code: u32) -> Result<()> {
        let message = verification_email(email, code, self.code_ttl);
        self.email.send(&message).await
    }

    /// Compares `submitted` with the pending code of `user_id`.
    ///
    /// A match consumes the code. The read and the delete are separate store
    /// calls, so two concurrent matching submissions may both succeed.
    #[tracing::instrument(skip(self, submitted), target = TRACING_TARGET_VERIFICATION)]
    pub async fn confirm_code(&self, user_id: UserId, submitted: u32) -> Result<ConfirmOutcome> {
        let outcome = match self.codes.get(user_id).await? {
            None => ConfirmOutcome::Expired,
            Some(stored) if stored != submitted => ConfirmOutcome::Incorrect,
            Some(_) => {
                self.codes.remove(user_id).await?;
                ConfirmOutcome::Confirmed
            }
        };

        tracing::debug!(
            target: TRACING_TARGET_VERIFICATION,
            %user_id,
            outcome = ?outcome,
            "Verification code checked"
        );
        Ok(outcome)
    }
}

/// Builds the verification email for `code`.
pub fn verification_email(to: &str, code: u32, ttl: Duration) -> EmailMessage {
    let body = format!(
        "Your verification code is: {code}\nThis code is valid for {}.",
        humanize_ttl(ttl)
    );
    EmailMessage::new(to, EMAIL_SUBJECT, body)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use syncauth_core::ErrorKind;
    use syncauth_kv::{KeyValueStore, MemoryStore};
    use syncauth_provider::MockMailbox;

    use super::*;

    const TTL: Duration = Duration::from_secs(120);
    const USER: UserId = UserId::new(1);

    fn manager() -> (VerificationManager, MockMailbox) {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mailbox = MockMailbox::new();
        let manager = VerificationManager::new(CodeStore::new(kv), mailbox.service(), TTL);
        (manager, mailbox)
    }

    #[tokio::test]
    async fn codes_are_six_digits() -> anyhow::Result<()> {
        let (verification, _) = manager();
        for _ in 0..32 {
            let code = verification.issue_code(USER).await?;
            assert!((MIN_CODE..=MAX_CODE).contains(&code));
        }
        Ok(())
    }

    #[tokio::test]
    async fn confirm_consumes_once() -> anyhow::Result<()> {
        let (verification, _) = manager();
        let code = verification.issue_code(USER).await?;

        assert_eq!(
            verification.confirm_code(USER, code).await?,
            ConfirmOutcome::Confirmed
        );
        assert_eq!(
            verification.confirm_code(USER, code).await?,
            ConfirmOutcome::Expired
        );
        Ok(())
    }

    #[tokio::test]
    async fn wrong_code_keeps_pending() -> anyhow::Result<()> {
        let (verification, _) = manager();
        let code = verification.issue_code(USER).await?;
        let wrong = if code == MAX_CODE { MIN_CODE } else { code + 1 };

        assert_eq!(
            verification.confirm_code(USER, wrong).await?,
            ConfirmOutcome::Incorrect
        );
        assert_eq!(
            verification.confirm_code(USER, code).await?,
            ConfirmOutcome::Confirmed
        );
        Ok(())
    }

    #[tokio::test]
    async fn confirm_without_code_is_expired() -> anyhow::Result<()> {
        let (verification, _) = manager();
        assert_eq!(
            verification.confirm_code(USER, 123_456).await?,
            ConfirmOutcome::Expired
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn code_times_out() -> anyhow::Result<()> {
        let (verification, _) = manager();
        let code = verification.issue_code(USER).await?;

        tokio::time::advance(TTL).await;
        assert_eq!(
            verification.confirm_code(USER, code).await?,
            ConfirmOutcome::Expired
        );
        Ok(())
    }

    #[tokio::test]
    async fn reissue_invalidates_previous_code() -> anyhow::Result<()> {
        let (verification, _) = manager();
        let first = verification.issue_code(USER).await?;
        let mut second = verification.issue_code(USER).await?;
        while second == first {
            second = verification.issue_code(USER).await?;
        }

        assert_eq!(
            verification.confirm_code(USER, first).await?,
            ConfirmOutcome::Incorrect
        );
        assert_eq!(
            verification.confirm_code(USER, second).await?,
            ConfirmOutcome::Confirmed
        );
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_confirmations_are_not_serialized() -> anyhow::Result<()> {
        let (verification, _) = manager();
        let code = verification.issue_code(USER).await?;

        let (first, second) = tokio::join!(
            verification.confirm_code(USER, code),
            verification.confirm_code(USER, code)
        );
        let confirmed = [first?, second?]
            .into_iter()
            .filter(|outcome| outcome.is_success())
            .count();

        // Either one or both may win; the store offers no compare-and-delete.
        assert!((1..=2).contains(&confirmed));
        Ok(())
    }

    #[tokio::test]
    async fn sends_templated_email() -> anyhow::Result<()> {
        let (verification, mailbox) = manager();
        verification.send_code("a@example.com", 654_321).await?;

        let sent = mailbox.last().await.ok_or_else(|| anyhow::anyhow!("no email"))?;
        assert_eq!(sent.to, "a@example.com");
        assert_eq!(sent.subject, EMAIL_SUBJECT);
        assert_eq!(
            sent.body,
            "Your verification code is: 654321\nThis code is valid for 2m."
        );
        Ok(())
    }

    #[tokio::test]
    async fn delivery_failure_keeps_code() -> anyhow::Result<()> {
        let (verification, mailbox) = manager();
        mailbox.set_failing(true).await;

        let code = verification.issue_code(USER).await?;
        let error = verification
            .send_code("a@example.com", code)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DeliveryFailed);
        assert_eq!(
            verification.confirm_code(USER, code).await?,
            ConfirmOutcome::Confirmed
        );
        Ok(())
    }
}
