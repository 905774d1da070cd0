//! Store staff table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Store staff constraint violations.
///
/// The composite primary key enforces that a user holds at most one staff
/// position per store.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum StoreStaffConstraints {
    #[strum(serialize = "store_staff_pkey")]
    Pkey,
}

impl StoreStaffConstraints {
    /// Creates a new [`StoreStaffConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            StoreStaffConstraints::Pkey => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<StoreStaffConstraints> for String {
    #[inline]
    fn from(val: StoreStaffConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for StoreStaffConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
