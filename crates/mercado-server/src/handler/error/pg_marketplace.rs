//! Store, product and report constraint violation error handlers.

use mercado_postgres::types::{
    AppReportConstraints, ProductConstraints, ProductReportConstraints, StoreConstraints,
    StoreStaffConstraints,
};

use crate::handler::{Error, ErrorKind};

impl From<StoreConstraints> for Error<'static> {
    fn from(constraint: StoreConstraints) -> Self {
        let error = match constraint {
            StoreConstraints::NameLength => ErrorKind::BadRequest
                .with_message("Store name must be between 3 and 30 characters long"),
            StoreConstraints::ImageUrlNotEmpty => {
                ErrorKind::BadRequest.with_message("Store image URL cannot be empty")
            }
            StoreConstraints::NameUnique => {
                ErrorKind::Conflict.with_message("A store with this name already exists")
            }
        };

        error.with_resource("store")
    }
}

impl From<StoreStaffConstraints> for Error<'static> {
    fn from(constraint: StoreStaffConstraints) -> Self {
        let error = match constraint {
            StoreStaffConstraints::Pkey => {
                ErrorKind::Conflict.with_message("This user is already on the store's staff")
            }
        };

        error.with_resource("staff")
    }
}

impl From<ProductConstraints> for Error<'static> {
    fn from(constraint: ProductConstraints) -> Self {
        let error = match constraint {
            ProductConstraints::NameLength => ErrorKind::BadRequest
                .with_message("Product name must be between 1 and 60 characters long"),
            ProductConstraints::PriceNonNegative => {
                ErrorKind::BadRequest.with_message("Product price cannot be negative")
            }
            ProductConstraints::PurchasePriceNonNegative => {
                ErrorKind::BadRequest.with_message("Product purchase price cannot be negative")
            }
            // Sales decrement stock inside a guarded update, so a violation
            // here means a concurrent sale drained the remaining stock.
            ProductConstraints::StockNonNegative => {
                ErrorKind::Conflict.with_message("Product is out of stock")
            }
            ProductConstraints::SoldCountNonNegative => ErrorKind::InternalServerError.into_error(),
        };

        error.with_resource("product")
    }
}

impl From<ProductReportConstraints> for Error<'static> {
    fn from(constraint: ProductReportConstraints) -> Self {
        let error = match constraint {
            ProductReportConstraints::TitleLength => ErrorKind::BadRequest
                .with_message("Report title must be between 1 and 120 characters long"),
            ProductReportConstraints::DescriptionNotEmpty => {
                ErrorKind::BadRequest.with_message("Report description cannot be empty")
            }
        };

        error.with_resource("report")
    }
}

impl From<AppReportConstraints> for Error<'static> {
    fn from(constraint: AppReportConstraints) -> Self {
        let error = match constraint {
            AppReportConstraints::TitleLength => ErrorKind::BadRequest
                .with_message("Report title must be between 1 and 120 characters long"),
            AppReportConstraints::DescriptionNotEmpty => {
                ErrorKind::BadRequest.with_message("Report description cannot be empty")
            }
        };

        error.with_resource("report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_store_name_is_a_conflict() {
        let error: Error<'static> = StoreConstraints::NameUnique.into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("store"));
    }

    #[test]
    fn drained_stock_is_a_conflict() {
        let error: Error<'static> = ProductConstraints::StockNonNegative.into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("product"));
    }

    #[test]
    fn empty_report_description_is_a_bad_request() {
        let error: Error<'static> = AppReportConstraints::DescriptionNotEmpty.into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.resource(), Some("report"));
    }
}
