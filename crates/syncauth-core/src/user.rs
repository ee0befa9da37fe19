//! User record types and the user store seam.

use std::num::ParseIntError;
use std::str::FromStr;

use derive_more::{Display, From, Into};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Opaque integer identifier of a user.
///
/// Renders as a plain decimal string, which is also the access token subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display, From, Into, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Creates a new user identifier.
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[inline]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

/// A user record as seen by the credential layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Normalized email address.
    pub email: String,
    /// PHC-formatted password digest, absent for OAuth-created accounts.
    pub password_hash: Option<String>,
    /// Whether the email address has been confirmed.
    pub email_verified: bool,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

impl User {
    /// Returns whether the account can sign in with a password.
    #[inline]
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Relational store of user records.
///
/// Implementations map unique-email violations to
/// [`ErrorKind::UserExists`](crate::ErrorKind::UserExists) and missing rows to
/// [`ErrorKind::UserNotFound`](crate::ErrorKind::UserNotFound). Emails are
/// passed through [`normalize_email`] before they reach the store.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user and returns its identifier.
    async fn create_user(&self, email: &str, password_hash: Option<String>) -> Result<UserId>;

    /// Finds a user by email.
    async fn user_by_email(&self, email: &str) -> Result<User>;

    /// Finds a user by identifier.
    async fn user_by_id(&self, user_id: UserId) -> Result<User>;

    /// Marks the user's email as verified.
    async fn mark_email_verified(&self, user_id: UserId) -> Result<()>;
}

/// Trims and lowercases an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
