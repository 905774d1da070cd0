//! Stores table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Store table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum StoreConstraints {
    #[strum(serialize = "stores_name_length")]
    NameLength,
    #[strum(serialize = "stores_image_url_not_empty")]
    ImageUrlNotEmpty,

    #[strum(serialize = "stores_name_unique_idx")]
    NameUnique,
}

impl StoreConstraints {
    /// Creates a new [`StoreConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            StoreConstraints::NameLength | StoreConstraints::ImageUrlNotEmpty => {
                ConstraintCategory::Validation
            }
            StoreConstraints::NameUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<StoreConstraints> for String {
    #[inline]
    fn from(val: StoreConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for StoreConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
