//! Database query repositories for all entities in the system.
//!
//! This module contains repository implementations that provide high-level
//! database operations for all entities, encapsulating common patterns
//! and providing type-safe interfaces.
//!
//! # Quota-gated creation
//!
//! Stores, products, managers and employees are created through repository
//! methods that run the quota check and the insert inside one transaction,
//! holding a row lock on the store owner. Two racing creations for the same
//! owner therefore serialize instead of both passing a stale count. Such
//! methods report a [`QuotaOutcome`] rather than a bare row.

pub mod app_report;
pub mod product;
pub mod product_report;
pub mod role;
pub mod store;
pub mod store_staff;
pub mod user;
pub mod user_role;

pub use app_report::{AppReportRepository, ResolveOutcome};
pub use product::{ProductRepository, SaleOutcome};
pub use product_report::ProductReportRepository;
pub use role::RoleRepository;
pub use store::StoreRepository;
pub use store_staff::StoreStaffRepository;
pub use user::UserRepository;
pub use user_role::UserRoleRepository;

/// Outcome of a creation gated by the store owner's role quota.
///
/// Quotas are always evaluated against the roles of the user who owns the
/// resource, also when a manager acts on the owner's store.
#[derive(Debug, Clone, PartialEq)]
pub enum QuotaOutcome<T> {
    /// The count was below the effective limit and the row was inserted.
    Created(T),
    /// The owner holds no roles; a user without roles has zero quota for
    /// everything.
    MissingRoles,
    /// The owner's count has reached the effective limit.
    LimitReached {
        /// The effective limit the count has reached.
        limit: i64,
    },
}

impl<T> QuotaOutcome<T> {
    /// Returns the created row if the quota admitted the creation.
    pub fn created(self) -> Option<T> {
        match self {
            QuotaOutcome::Created(row) => Some(row),
            _ => None,
        }
    }

    /// Returns whether the creation was denied.
    pub fn is_denied(&self) -> bool {
        !matches!(self, QuotaOutcome::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_outcome_accessors() {
        let created = QuotaOutcome::Created(7_u32);
        assert!(!created.is_denied());
        assert_eq!(created.created(), Some(7));

        let missing: QuotaOutcome<u32> = QuotaOutcome::MissingRoles;
        assert!(missing.is_denied());
        assert_eq!(missing.created(), None);

        let reached: QuotaOutcome<u32> = QuotaOutcome::LimitReached { limit: 5 };
        assert!(reached.is_denied());
        assert_eq!(reached.created(), None);
    }
}
