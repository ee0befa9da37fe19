//! Lettre-based SMTP client.

use std::sync::Arc;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::{Error, Result, SmtpConfig, TRACING_TARGET};
use crate::{EmailMessage, EmailProvider, EmailService};

struct SmtpClientInner {
    transport: SmtpTransport,
    sender: Mailbox,
    config: SmtpConfig,
}

/// SMTP client delivering plain-text messages through a STARTTLS relay.
///
/// The underlying transport is blocking; each send runs on the blocking pool.
#[derive(Clone)]
pub struct SmtpClient {
    inner: Arc<SmtpClientInner>,
}

impl std::fmt::Debug for SmtpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl SmtpClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: SmtpConfig) -> Result<Self> {
        config.validate()?;
        let sender: Mailbox = config.smtp_sender.parse()?;

        tracing::debug!(
            target: TRACING_TARGET,
            host = %config.smtp_host,
            port = config.smtp_port,
            "Creating SMTP client"
        );

        let mut builder = SmtpTransport::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .timeout(Some(config.effective_timeout()));
        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let inner = SmtpClientInner {
            transport: builder.build(),
            sender,
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &SmtpConfig {
        &self.inner.config
    }

    /// Converts this client into an [`EmailService`].
    pub fn into_service(self) -> EmailService {
        EmailService::new(self)
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<()> {
        let email = build_message(&self.inner.sender, message)?;
        let inner = Arc::clone(&self.inner);

        let response = tokio::task::spawn_blocking(move || inner.transport.send(&email)).await??;

        tracing::debug!(
            target: TRACING_TARGET,
            code = %response.code(),
            "SMTP relay accepted message"
        );
        Ok(())
    }
}

fn build_message(sender: &Mailbox, message: &EmailMessage) -> Result<Message> {
    let to: Mailbox = message.to.parse()?;
    let message = Message::builder()
        .from(sender.clone())
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())?;
    Ok(message)
}

#[async_trait::async_trait]
impl EmailProvider for SmtpClient {
    async fn send(&self, message: &EmailMessage) -> syncauth_core::Result<()> {
        self.deliver(message).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> anyhow::Result<Mailbox> {
        Ok("Syncauth <noreply@example.com>".parse()?)
    }

    #[test]
    fn builds_plain_text_message() -> anyhow::Result<()> {
        let message = EmailMessage::new("user@example.com", "Subject", "Body");
        let built = build_message(&sender()?, &message)?;

        let formatted = String::from_utf8(built.formatted())?;
        assert!(formatted.contains("To: user@example.com"));
        assert!(formatted.contains("Subject: Subject"));
        assert!(formatted.contains("text/plain"));
        Ok(())
    }

    #[test]
    fn rejects_invalid_recipient() -> anyhow::Result<()> {
        let message = EmailMessage::new("nobody", "Subject", "Body");
        assert!(matches!(
            build_message(&sender()?, &message),
            Err(Error::Address(_))
        ));
        Ok(())
    }
}
