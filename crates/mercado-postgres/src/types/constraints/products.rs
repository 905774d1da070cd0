//! Products table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Product table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum ProductConstraints {
    #[strum(serialize = "products_name_length")]
    NameLength,
    #[strum(serialize = "products_price_non_negative")]
    PriceNonNegative,
    #[strum(serialize = "products_purchase_price_non_negative")]
    PurchasePriceNonNegative,
    // Also raised when a concurrent sale drains the last unit; the sale
    // query guards against it with a conditional update.
    #[strum(serialize = "products_stock_non_negative")]
    StockNonNegative,
    #[strum(serialize = "products_sold_count_non_negative")]
    SoldCountNonNegative,
}

impl ProductConstraints {
    /// Creates a new [`ProductConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ProductConstraints::NameLength => ConstraintCategory::Validation,

            ProductConstraints::PriceNonNegative
            | ProductConstraints::PurchasePriceNonNegative
            | ProductConstraints::StockNonNegative
            | ProductConstraints::SoldCountNonNegative => ConstraintCategory::BusinessLogic,
        }
    }
}

impl From<ProductConstraints> for String {
    #[inline]
    fn from(val: ProductConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ProductConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
