//! User repository for managing user records.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use syncauth_core::normalize_email;

use crate::model::{NewUser, User};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for user database operations.
pub trait UserRepository {
    /// Creates a new user.
    ///
    /// Fails with a unique violation when the normalized email is taken.
    fn create_user(&mut self, new_user: NewUser) -> impl Future<Output = PgResult<User>> + Send;

    /// Finds a user by its identifier.
    fn find_user_by_id(&mut self, user_id: i64)
    -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Finds a user by email address. Comparison is case-insensitive.
    fn find_user_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Marks the user's email as verified.
    ///
    /// Returns `None` if the user was not found.
    fn verify_user_email(
        &mut self,
        user_id: i64,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;
}

impl UserRepository for PgConnection {
    async fn create_user(&mut self, mut new_user: NewUser) -> PgResult<User> {
        use schema::users;

        new_user.email = normalize_email(&new_user.email);

        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_user_by_id(&mut self, user_id: i64) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::id.eq(user_id))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_user_by_email(&mut self, email: &str) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::email.eq(normalize_email(email)))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn verify_user_email(&mut self, user_id: i64) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        diesel::update(users::table.filter(dsl::id.eq(user_id)))
            .set(dsl::email_verified.eq(true))
            .returning(User::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }
}
