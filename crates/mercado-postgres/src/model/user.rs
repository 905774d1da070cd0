//! Main user model for PostgreSQL database operations.
//!
//! This module provides the core user model for authentication and account
//! management. Administrative standing lives directly on the row so that
//! every request re-reads it; tokens never carry privilege claims.
//!
//! ## Models
//!
//! - [`User`] - Main user model with credentials and administrative flags
//! - [`NewUser`] - Data structure for creating new users
//! - [`UpdateUser`] - Data structure for updating existing users

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::users;

/// Main user model representing an account in the system.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Administrative privileges across the entire system.
    pub is_admin: bool,
    /// Marks the single irremovable administrator.
    pub is_principal_admin: bool,
    /// Unique login handle (3-24 lowercase alphanumeric characters).
    pub username: String,
    /// Primary email for login and communications.
    pub email_address: String,
    /// Securely hashed password in PHC string format.
    pub password_hash: String,
    /// Optional URL to profile avatar image.
    pub avatar_url: Option<String>,
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
    /// Unique login handle (3-24 lowercase alphanumeric characters).
    pub username: String,
    /// Primary email for login and communications.
    pub email_address: String,
    /// Securely hashed password in PHC string format.
    pub password_hash: String,
    /// Optional URL to profile avatar image.
    pub avatar_url: Option<String>,
    /// Administrative privileges, set only by the bootstrap path.
    pub is_admin: bool,
    /// Principal administrator flag, set only by the bootstrap path.
    pub is_principal_admin: bool,
}

/// Data for updating a user.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateUser {
    /// Unique login handle.
    pub username: Option<String>,
    /// Primary email for login and communications.
    pub email_address: Option<String>,
    /// Securely hashed password.
    pub password_hash: Option<String>,
    /// URL to profile avatar image.
    pub avatar_url: Option<String>,
    /// Administrative privileges.
    pub is_admin: Option<bool>,
}

impl User {
    /// Returns whether the user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Returns whether the user is the principal admin.
    pub fn is_principal_admin(&self) -> bool {
        self.is_principal_admin
    }

    /// Returns whether this user's admin standing can be revoked.
    ///
    /// The principal admin can never be demoted or removed.
    pub fn is_demotable(&self) -> bool {
        self.is_admin && !self.is_principal_admin
    }

    /// Returns whether the user has an avatar URL configured.
    pub fn has_avatar(&self) -> bool {
        self.avatar_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_flags(is_admin: bool, is_principal_admin: bool) -> User {
        let now = jiff::Timestamp::now();
        User {
            id: Uuid::new_v4(),
            is_admin,
            is_principal_admin,
            username: "alice1".to_owned(),
            email_address: "alice@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            avatar_url: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn principal_admin_is_not_demotable() {
        assert!(user_with_flags(true, false).is_demotable());
        assert!(!user_with_flags(true, true).is_demotable());
        assert!(!user_with_flags(false, false).is_demotable());
    }
}
