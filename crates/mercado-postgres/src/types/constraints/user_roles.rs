//! User role assignment table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// User role assignment constraint violations.
///
/// The composite primary key doubles as the only business rule on this
/// table: a role can be assigned to a user at most once.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum UserRoleConstraints {
    #[strum(serialize = "user_roles_pkey")]
    Pkey,
}

impl UserRoleConstraints {
    /// Creates a new [`UserRoleConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            UserRoleConstraints::Pkey => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<UserRoleConstraints> for String {
    #[inline]
    fn from(val: UserRoleConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for UserRoleConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
