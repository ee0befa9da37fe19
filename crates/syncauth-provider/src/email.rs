//! Email delivery seam and its logging wrapper.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use syncauth_core::Result;

use crate::TRACING_TARGET_EMAIL;

/// A plain-text message addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl EmailMessage {
    /// Creates a new message.
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Delivers email messages.
///
/// Implementations report failures as
/// [`ErrorKind::DeliveryFailed`](syncauth_core::ErrorKind::DeliveryFailed).
#[async_trait::async_trait]
pub trait EmailProvider: Send + Sync {
    /// Sends the message.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Email provider wrapper with observability.
///
/// The inner provider is wrapped in `Arc` for cheap cloning.
#[derive(Clone)]
pub struct EmailService {
    inner: Arc<dyn EmailProvider>,
}

impl fmt::Debug for EmailService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailService").finish_non_exhaustive()
    }
}

impl EmailService {
    /// Creates a new email service wrapper.
    pub fn new<P>(provider: P) -> Self
    where
        P: EmailProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Sends a message through the inner provider.
    pub async fn send(&self, message: &EmailMessage) -> Result<()> {
        let started_at = Instant::now();

        tracing::debug!(
            target: TRACING_TARGET_EMAIL,
            subject = %message.subject,
            body_len = message.body.len(),
            "Sending email"
        );

        let result = self.inner.send(message).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(()) => {
                tracing::debug!(
                    target: TRACING_TARGET_EMAIL,
                    elapsed_ms = elapsed.as_millis(),
                    "Email sent"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_EMAIL,
                    error = %error,
                    elapsed_ms = elapsed.as_millis(),
                    "Email delivery failed"
                );
            }
        }

        result
    }
}
