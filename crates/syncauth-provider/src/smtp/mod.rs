//! SMTP email delivery over STARTTLS.
//!
//! ```rust,ignore
//! use syncauth_provider::smtp::{SmtpClient, SmtpConfig};
//!
//! let client = SmtpClient::new(SmtpConfig::new("smtp.example.com", "noreply@example.com"))?;
//! let service = client.into_service();
//! ```

mod client;
mod config;
mod error;

pub use client::SmtpClient;
pub use config::SmtpConfig;
pub use error::{Error, Result};

/// Tracing target for SMTP client operations.
pub const TRACING_TARGET: &str = "syncauth_provider::smtp";
