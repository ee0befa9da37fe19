//! [`UserStore`] implementation over the connection pool.

use syncauth_core::{Error, ErrorKind, Result, User, UserId, UserStore};

use crate::model::NewUser;
use crate::query::UserRepository;
use crate::{PgClient, TRACING_TARGET_QUERY};

#[async_trait::async_trait]
impl UserStore for PgClient {
    #[tracing::instrument(skip(self, email, password_hash), target = TRACING_TARGET_QUERY)]
    async fn create_user(&self, email: &str, password_hash: Option<String>) -> Result<UserId> {
        let mut conn = self.get_connection().await?;
        let new_user = NewUser {
            email: email.to_owned(),
            password_hash,
        };

        let user = conn.create_user(new_user).await.map_err(|e| {
            if !e.is_unique_violation() {
                tracing::error!(target: TRACING_TARGET_QUERY, error = %e, "Failed to create user");
            }
            Error::from(e)
        })?;

        tracing::debug!(target: TRACING_TARGET_QUERY, user_id = user.id, "User created");
        Ok(UserId::new(user.id))
    }

    #[tracing::instrument(skip(self, email), target = TRACING_TARGET_QUERY)]
    async fn user_by_email(&self, email: &str) -> Result<User> {
        let mut conn = self.get_connection().await?;
        conn.find_user_by_email(email)
            .await?
            .map(User::from)
            .ok_or_else(|| Error::new(ErrorKind::UserNotFound))
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    async fn user_by_id(&self, user_id: UserId) -> Result<User> {
        let mut conn = self.get_connection().await?;
        conn.find_user_by_id(user_id.as_i64())
            .await?
            .map(User::from)
            .ok_or_else(|| Error::new(ErrorKind::UserNotFound))
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    async fn mark_email_verified(&self, user_id: UserId) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.verify_user_email(user_id.as_i64())
            .await?
            .map(|_| ())
            .ok_or_else(|| Error::new(ErrorKind::UserNotFound))
    }
}
