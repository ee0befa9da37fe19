//! Recording providers for testing.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! syncauth-provider = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use syncauth_core::{Error, Result};
use tokio::sync::Mutex;

use crate::{EmailMessage, EmailProvider, EmailService, OAuthProvider};

#[derive(Debug, Default)]
struct MailboxInner {
    sent: Vec<EmailMessage>,
    failing: bool,
}

/// [`EmailProvider`] that records every message instead of sending it.
///
/// Clones share the same mailbox, so a test can keep one handle while the
/// service under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MockMailbox {
    inner: Arc<Mutex<MailboxInner>>,
}

impl MockMailbox {
    /// Creates an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an [`EmailService`] delivering into this mailbox.
    pub fn service(&self) -> EmailService {
        EmailService::new(self.clone())
    }

    /// Makes subsequent sends fail with `DeliveryFailed`.
    pub async fn set_failing(&self, failing: bool) {
        self.inner.lock().await.failing = failing;
    }

    /// Returns every recorded message in delivery order.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.inner.lock().await.sent.clone()
    }

    /// Returns the most recent message.
    pub async fn last(&self) -> Option<EmailMessage> {
        self.inner.lock().await.sent.last().cloned()
    }
}

#[async_trait::async_trait]
impl EmailProvider for MockMailbox {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.failing {
            return Err(Error::delivery_failed().with_message("Mock mailbox is failing"));
        }

        inner.sent.push(message.clone());
        Ok(())
    }
}

/// [`OAuthProvider`] answering from a fixed code-to-email table.
///
/// Known codes exchange to the token `mock-token:{code}`; unknown codes and
/// tokens fail with `ProviderFailed`.
#[derive(Debug, Clone, Default)]
pub struct MockOAuthProvider {
    accounts: HashMap<String, String>,
}

impl MockOAuthProvider {
    /// Creates a provider that knows no codes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `code` and resolves it to `email`.
    #[must_use]
    pub fn with_account(mut self, code: impl Into<String>, email: impl Into<String>) -> Self {
        self.accounts.insert(code.into(), email.into());
        self
    }
}

#[async_trait::async_trait]
impl OAuthProvider for MockOAuthProvider {
    async fn exchange_code(&self, code: &str) -> Result<String> {
        if self.accounts.contains_key(code) {
            Ok(format!("mock-token:{code}"))
        } else {
            Err(Error::provider_failed().with_message("Unknown authorization code"))
        }
    }

    async fn fetch_verified_email(&self, access_token: &str) -> Result<String> {
        access_token
            .strip_prefix("mock-token:")
            .and_then(|code| self.accounts.get(code))
            .cloned()
            .ok_or_else(|| Error::provider_failed().with_message("Unknown access token"))
    }
}

#[cfg(test)]
mod tests {
    use syncauth_core::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn mailbox_records_and_fails() -> anyhow::Result<()> {
        let mailbox = MockMailbox::new();
        let service = mailbox.service();

        service
            .send(&EmailMessage::new("a@example.com", "Hi", "Body"))
            .await?;
        assert_eq!(mailbox.sent().await.len(), 1);

        mailbox.set_failing(true).await;
        let error = service
            .send(&EmailMessage::new("a@example.com", "Hi", "Body"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DeliveryFailed);
        assert_eq!(mailbox.sent().await.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn oauth_mock_resolves_known_codes() -> anyhow::Result<()> {
        let provider = MockOAuthProvider::new().with_account("good", "user@example.com");

        let token = provider.exchange_code("good").await?;
        assert_eq!(provider.fetch_verified_email(&token).await?, "user@example.com");

        let error = provider.exchange_code("bad").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ProviderFailed);
        Ok(())
    }
}
