//! Application reports table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Application report table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum AppReportConstraints {
    #[strum(serialize = "app_reports_title_length")]
    TitleLength,
    #[strum(serialize = "app_reports_description_not_empty")]
    DescriptionNotEmpty,
}

impl AppReportConstraints {
    /// Creates a new [`AppReportConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            AppReportConstraints::TitleLength | AppReportConstraints::DescriptionNotEmpty => {
                ConstraintCategory::Validation
            }
        }
    }
}

impl From<AppReportConstraints> for String {
    #[inline]
    fn from(val: AppReportConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for AppReportConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
