//! Database constraint violations organized by table.
//!
//! This module provides an enumeration of all database constraint violations,
//! organized into per-table modules so that query-layer errors can be mapped
//! to precise API responses.

pub mod app_reports;
pub mod product_reports;
pub mod products;
pub mod roles;
pub mod store_staff;
pub mod stores;
pub mod user_roles;
pub mod users;

use std::fmt;

// Re-export all constraint types for convenience
pub use app_reports::AppReportConstraints;
pub use product_reports::ProductReportConstraints;
pub use products::ProductConstraints;
pub use roles::RoleConstraints;
use serde::{Deserialize, Serialize};
pub use store_staff::StoreStaffConstraints;
pub use stores::StoreConstraints;
pub use user_roles::UserRoleConstraints;
pub use users::UserConstraints;

/// Unified constraint violation enum that can represent any database constraint.
///
/// This enum wraps all specific constraint types, providing a single interface
/// for handling any constraint violation while maintaining type safety and
/// the organizational benefits of the separate modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    User(UserConstraints),
    UserRole(UserRoleConstraints),
    Role(RoleConstraints),
    Store(StoreConstraints),
    StoreStaff(StoreStaffConstraints),
    Product(ProductConstraints),
    ProductReport(ProductReportConstraints),
    AppReport(AppReportConstraints),
}

/// Categories of database constraint violations.
///
/// This enum helps classify constraint violations by their purpose and type,
/// making it easier to handle different categories of errors appropriately.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Data validation constraints (format, length, range checks).
    Validation,
    /// Business logic constraints (domain-specific rules).
    BusinessLogic,
    /// Uniqueness constraints (primary keys, unique indexes).
    Uniqueness,
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    ///
    /// This method attempts to parse a constraint name string into the
    /// corresponding enum variant. It returns `None` if the constraint name
    /// is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use mercado_postgres::types::ConstraintViolation;
    ///
    /// let violation = ConstraintViolation::new("users_username_unique_idx");
    /// assert!(violation.is_some());
    ///
    /// let unknown = ConstraintViolation::new("unknown_constraint");
    /// assert!(unknown.is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        // Route based on constraint name prefix to avoid unnecessary
        // parsing attempts.

        if constraint.starts_with("users_") {
            if let Some(c) = UserConstraints::new(constraint) {
                return Some(ConstraintViolation::User(c));
            }
        } else if constraint.starts_with("user_roles_") {
            if let Some(c) = UserRoleConstraints::new(constraint) {
                return Some(ConstraintViolation::UserRole(c));
            }
        } else if constraint.starts_with("roles_") {
            if let Some(c) = RoleConstraints::new(constraint) {
                return Some(ConstraintViolation::Role(c));
            }
        } else if constraint.starts_with("stores_") {
            if let Some(c) = StoreConstraints::new(constraint) {
                return Some(ConstraintViolation::Store(c));
            }
        } else if constraint.starts_with("store_staff_") {
            if let Some(c) = StoreStaffConstraints::new(constraint) {
                return Some(ConstraintViolation::StoreStaff(c));
            }
        } else if constraint.starts_with("products_") {
            if let Some(c) = ProductConstraints::new(constraint) {
                return Some(ConstraintViolation::Product(c));
            }
        } else if constraint.starts_with("product_reports_") {
            if let Some(c) = ProductReportConstraints::new(constraint) {
                return Some(ConstraintViolation::ProductReport(c));
            }
        } else if constraint.starts_with("app_reports_")
            && let Some(c) = AppReportConstraints::new(constraint)
        {
            return Some(ConstraintViolation::AppReport(c));
        }

        None
    }

    /// Returns the table name associated with this constraint.
    ///
    /// This is useful for categorizing errors by the table they affect.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::User(_) => "users",
            ConstraintViolation::UserRole(_) => "user_roles",
            ConstraintViolation::Role(_) => "roles",
            ConstraintViolation::Store(_) => "stores",
            ConstraintViolation::StoreStaff(_) => "store_staff",
            ConstraintViolation::Product(_) => "products",
            ConstraintViolation::ProductReport(_) => "product_reports",
            ConstraintViolation::AppReport(_) => "app_reports",
        }
    }

    /// Returns the category of this constraint violation.
    ///
    /// This helps categorize errors by their type for better error handling
    /// and reporting.
    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::User(c) => c.categorize(),
            ConstraintViolation::UserRole(c) => c.categorize(),
            ConstraintViolation::Role(c) => c.categorize(),
            ConstraintViolation::Store(c) => c.categorize(),
            ConstraintViolation::StoreStaff(c) => c.categorize(),
            ConstraintViolation::Product(c) => c.categorize(),
            ConstraintViolation::ProductReport(c) => c.categorize(),
            ConstraintViolation::AppReport(c) => c.categorize(),
        }
    }

    /// Returns the underlying constraint name as used in the database.
    #[inline]
    pub fn constraint_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::User(c) => write!(f, "{}", c),
            ConstraintViolation::UserRole(c) => write!(f, "{}", c),
            ConstraintViolation::Role(c) => write!(f, "{}", c),
            ConstraintViolation::Store(c) => write!(f, "{}", c),
            ConstraintViolation::StoreStaff(c) => write!(f, "{}", c),
            ConstraintViolation::Product(c) => write!(f, "{}", c),
            ConstraintViolation::ProductReport(c) => write!(f, "{}", c),
            ConstraintViolation::AppReport(c) => write!(f, "{}", c),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("Unknown constraint: {}", value))
    }
}
