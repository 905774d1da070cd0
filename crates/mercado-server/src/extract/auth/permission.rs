//! Core authorization types and utilities.
//!
//! This module provides the fundamental types used for authorization
//! throughout the marketplace: store permissions, the roles that grant
//! them, and the verdict produced by an authorization check.

use std::borrow::Cow;

use mercado_postgres::types::StaffPosition;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use utoipa::ToSchema;

use crate::handler::{ErrorKind, Result};

/// Effective role a user holds within a single store.
///
/// The author role is derived from store ownership; the staff roles come
/// from `store_staff` rows. Global administrators act outside this
/// hierarchy and are represented by [`StoreAccess::Admin`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StoreRole {
    /// The store's owner.
    Author,
    /// Staff member who can manage the store and its employees.
    Manager,
    /// Staff member limited to day-to-day product work.
    Employee,
}

impl From<StaffPosition> for StoreRole {
    fn from(position: StaffPosition) -> Self {
        match position {
            StaffPosition::Manager => StoreRole::Manager,
            StaffPosition::Employee => StoreRole::Employee,
        }
    }
}

/// Granular store permissions for authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, EnumString)]
pub enum StorePermission {
    // Store-level permissions
    /// Can view store details.
    ViewStore,
    /// Can update store name and image.
    ManageStore,
    /// Can delete the entire store.
    DeleteStore,

    // Staff permissions
    /// Can view the store's staff rosters.
    ViewStaff,
    /// Can hire and dismiss managers.
    ManageManagers,
    /// Can hire and dismiss employees.
    ManageEmployees,

    // Product permissions
    /// Can view the store's products.
    ViewProducts,
    /// Can create, update, and delete products.
    ManageProducts,
    /// Can record product sales.
    RecordSales,

    // Report permissions
    /// Can view reports filed against the store's products.
    ViewReports,
    /// Can file a report against a product.
    FileReports,
    /// Can dismiss reports filed against the store's products.
    ManageReports,
}

impl StorePermission {
    /// Checks if the given store role satisfies this permission requirement.
    pub const fn is_permitted_by_role(self, role: StoreRole) -> bool {
        use StoreRole::{Author, Employee, Manager};

        match self {
            // Store-level permissions
            Self::ViewStore => matches!(role, Author | Manager | Employee),
            Self::ManageStore => matches!(role, Author | Manager),
            Self::DeleteStore => matches!(role, Author),

            // Staff permissions
            Self::ViewStaff => matches!(role, Author | Manager),
            Self::ManageManagers => matches!(role, Author),
            Self::ManageEmployees => matches!(role, Author | Manager),

            // Product permissions
            Self::ViewProducts => matches!(role, Author | Manager | Employee),
            Self::ManageProducts => matches!(role, Author | Manager),
            Self::RecordSales => matches!(role, Author | Manager | Employee),

            // Report permissions
            Self::ViewReports => matches!(role, Author | Manager),
            Self::FileReports => matches!(role, Author | Manager | Employee),
            Self::ManageReports => matches!(role, Author | Manager),
        }
    }

    /// Returns the minimum role required for this permission.
    #[must_use]
    pub const fn minimum_required_role(self) -> StoreRole {
        match self {
            // Employee-level permissions
            Self::ViewStore | Self::ViewProducts | Self::RecordSales | Self::FileReports => {
                StoreRole::Employee
            }

            // Manager-level permissions
            Self::ManageStore
            | Self::ViewStaff
            | Self::ManageEmployees
            | Self::ManageProducts
            | Self::ViewReports
            | Self::ManageReports => StoreRole::Manager,

            // Author-only permissions
            Self::DeleteStore | Self::ManageManagers => StoreRole::Author,
        }
    }

    /// Returns true if this permission is reserved for the store's author.
    #[must_use]
    pub const fn is_author_only(self) -> bool {
        matches!(self, Self::DeleteStore | Self::ManageManagers)
    }

    /// Returns all permissions available to the given role.
    pub fn permissions_for_role(role: StoreRole) -> Vec<Self> {
        Self::iter()
            .filter(|permission| permission.is_permitted_by_role(role))
            .collect()
    }
}

/// How an authorization check granted access to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAccess {
    /// Granted through global administrator standing.
    Admin,
    /// Granted because the user owns the store.
    Author,
    /// Granted through a staff position at the store.
    Staff(StaffPosition),
}

impl StoreAccess {
    /// Returns whether access was granted through admin standing.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, StoreAccess::Admin)
    }

    /// Returns the store role behind this access.
    ///
    /// Admin access acts outside the store's role hierarchy and has no
    /// corresponding role.
    #[must_use]
    pub fn role(self) -> Option<StoreRole> {
        match self {
            StoreAccess::Admin => None,
            StoreAccess::Author => Some(StoreRole::Author),
            StoreAccess::Staff(position) => Some(position.into()),
        }
    }
}

/// Verdict of a store authorization check.
#[must_use = "authorization verdicts do nothing unless acted upon"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// Access was granted, with how it was granted.
    Granted(StoreAccess),
    /// Access was denied, with the reason.
    Denied(Cow<'static, str>),
}

impl AuthResult {
    /// Creates a denied verdict with a reason.
    pub fn denied(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Denied(reason.into())
    }

    /// Returns whether access was granted.
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// Converts the verdict into a `Result`, erring when access is denied.
    pub fn into_result(self) -> Result<StoreAccess> {
        match self {
            Self::Granted(access) => Ok(access),
            Self::Denied(reason) => Err(ErrorKind::Forbidden
                .with_context(reason)
                .with_resource("store")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_holds_every_permission() {
        for permission in StorePermission::iter() {
            assert!(permission.is_permitted_by_role(StoreRole::Author));
        }
    }

    #[test]
    fn manager_lacks_only_author_permissions() {
        for permission in StorePermission::iter() {
            let expected = !permission.is_author_only();
            assert_eq!(
                permission.is_permitted_by_role(StoreRole::Manager),
                expected,
                "unexpected manager verdict for {:?}",
                permission
            );
        }
    }

    #[test]
    fn employee_permissions_are_day_to_day_only() {
        let granted = StorePermission::permissions_for_role(StoreRole::Employee);
        assert_eq!(
            granted,
            vec![
                StorePermission::ViewStore,
                StorePermission::ViewProducts,
                StorePermission::RecordSales,
                StorePermission::FileReports,
            ]
        );
    }

    #[test]
    fn permission_counts_per_role() {
        assert_eq!(StorePermission::permissions_for_role(StoreRole::Author).len(), 12);
        assert_eq!(StorePermission::permissions_for_role(StoreRole::Manager).len(), 10);
        assert_eq!(StorePermission::permissions_for_role(StoreRole::Employee).len(), 4);
    }

    #[test]
    fn minimum_roles_match_the_table() {
        assert_eq!(
            StorePermission::RecordSales.minimum_required_role(),
            StoreRole::Employee
        );
        assert_eq!(
            StorePermission::ManageProducts.minimum_required_role(),
            StoreRole::Manager
        );
        assert_eq!(
            StorePermission::ManageManagers.minimum_required_role(),
            StoreRole::Author
        );
    }

    #[test]
    fn staff_positions_map_onto_roles() {
        assert_eq!(
            StoreRole::from(StaffPosition::Manager),
            StoreRole::Manager
        );
        assert_eq!(
            StoreRole::from(StaffPosition::Employee),
            StoreRole::Employee
        );
    }

    #[test]
    fn denied_verdict_becomes_forbidden() {
        let verdict = AuthResult::denied("Not a member of this store's staff");
        assert!(!verdict.is_granted());

        let error = verdict.into_result().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(error.resource(), Some("store"));
    }

    #[test]
    fn granted_verdict_carries_access() {
        let verdict = AuthResult::Granted(StoreAccess::Staff(StaffPosition::Manager));
        let access = verdict.into_result().unwrap();
        assert_eq!(access.role(), Some(StoreRole::Manager));
        assert!(!access.is_admin());
    }
}
