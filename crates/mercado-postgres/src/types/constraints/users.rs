//! Users table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// User table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum UserConstraints {
    // User validation constraints
    #[strum(serialize = "users_username_length")]
    UsernameLength,
    #[strum(serialize = "users_username_format")]
    UsernameFormat,
    #[strum(serialize = "users_email_address_length_max")]
    EmailAddressLengthMax,
    #[strum(serialize = "users_password_hash_not_empty")]
    PasswordHashNotEmpty,

    // User business logic constraints
    #[strum(serialize = "users_principal_implies_admin")]
    PrincipalImpliesAdmin,

    // User unique constraints
    #[strum(serialize = "users_username_unique_idx")]
    UsernameUnique,
    #[strum(serialize = "users_email_address_unique_idx")]
    EmailAddressUnique,
    #[strum(serialize = "users_principal_admin_unique_idx")]
    PrincipalAdminUnique,
}

impl UserConstraints {
    /// Creates a new [`UserConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            UserConstraints::UsernameLength
            | UserConstraints::UsernameFormat
            | UserConstraints::EmailAddressLengthMax
            | UserConstraints::PasswordHashNotEmpty => ConstraintCategory::Validation,

            UserConstraints::PrincipalImpliesAdmin => ConstraintCategory::BusinessLogic,

            UserConstraints::UsernameUnique
            | UserConstraints::EmailAddressUnique
            | UserConstraints::PrincipalAdminUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<UserConstraints> for String {
    #[inline]
    fn from(val: UserConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for UserConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
