//! Product reports table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Product report table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum ProductReportConstraints {
    #[strum(serialize = "product_reports_title_length")]
    TitleLength,
    #[strum(serialize = "product_reports_description_not_empty")]
    DescriptionNotEmpty,
}

impl ProductReportConstraints {
    /// Creates a new [`ProductReportConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ProductReportConstraints::TitleLength
            | ProductReportConstraints::DescriptionNotEmpty => ConstraintCategory::Validation,
        }
    }
}

impl From<ProductReportConstraints> for String {
    #[inline]
    fn from(val: ProductReportConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ProductReportConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
