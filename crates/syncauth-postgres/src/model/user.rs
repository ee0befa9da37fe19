//! User row model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use syncauth_core::UserId;

use crate::schema::users;

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Normalized email address.
    pub email: String,
    /// PHC-formatted password digest, absent for OAuth-created accounts.
    pub password_hash: Option<String>,
    /// Whether the email address has been confirmed.
    pub email_verified: bool,
    /// Timestamp when the user was created.
    pub created_at: Timestamp,
    /// Timestamp when the user was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new user.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    /// Email address, normalized on insert.
    pub email: String,
    /// PHC-formatted password digest.
    pub password_hash: Option<String>,
}

impl From<User> for syncauth_core::User {
    fn from(row: User) -> Self {
        Self {
            id: UserId::new(row.id),
            email: row.email,
            password_hash: row.password_hash,
            email_verified: row.email_verified,
            created_at: jiff::Timestamp::from(row.created_at),
            updated_at: jiff::Timestamp::from(row.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_converts_to_domain_user() {
        let now = jiff::Timestamp::now();
        let row = User {
            id: 9,
            email: "a@example.com".into(),
            password_hash: None,
            email_verified: true,
            created_at: Timestamp::from(now),
            updated_at: Timestamp::from(now),
        };

        let user = syncauth_core::User::from(row);
        assert_eq!(user.id, UserId::new(9));
        assert!(!user.has_password());
        assert!(user.email_verified);
        assert_eq!(user.created_at, now);
    }
}
