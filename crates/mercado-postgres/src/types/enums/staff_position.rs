//! Staff position enumeration for store membership.

use std::cmp;

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::types::QuotaKind;

/// Defines the position a user holds on a store's staff.
///
/// This enumeration corresponds to the `STAFF_POSITION` PostgreSQL enum.
/// Managers run the store's day-to-day operations; employees work the floor
/// with a narrower set of capabilities.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString, ToSchema)]
#[ExistingTypePath = "crate::schema::sql_types::StaffPosition"]
pub enum StaffPosition {
    /// Runs the store: manages employees, products, and reports
    #[db_rename = "manager"]
    #[serde(rename = "manager")]
    Manager,

    /// Works the store: views products, records sales, and files reports
    #[db_rename = "employee"]
    #[serde(rename = "employee")]
    #[default]
    Employee,
}

impl StaffPosition {
    /// Returns the hierarchical level of this position (higher number = more permissions).
    #[inline]
    pub const fn hierarchy_level(self) -> u8 {
        match self {
            StaffPosition::Employee => 1,
            StaffPosition::Manager => 2,
        }
    }

    /// Returns whether this position has equal or higher permissions than the other.
    #[inline]
    pub const fn has_permission_level_of(self, other: StaffPosition) -> bool {
        self.hierarchy_level() >= other.hierarchy_level()
    }

    /// Returns the quota kind that gates staffing this position.
    #[inline]
    pub const fn quota_kind(self) -> QuotaKind {
        match self {
            StaffPosition::Manager => QuotaKind::Managers,
            StaffPosition::Employee => QuotaKind::Employees,
        }
    }
}

impl PartialOrd for StaffPosition {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StaffPosition {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.hierarchy_level().cmp(&other.hierarchy_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_outranks_employee() {
        assert!(StaffPosition::Manager > StaffPosition::Employee);
        assert!(StaffPosition::Manager.has_permission_level_of(StaffPosition::Employee));
        assert!(!StaffPosition::Employee.has_permission_level_of(StaffPosition::Manager));
    }

    #[test]
    fn serializes_to_lowercase() {
        assert_eq!(StaffPosition::Manager.to_string(), "Manager");
        assert_eq!(
            serde_json::to_string(&StaffPosition::Manager).unwrap(),
            "\"manager\""
        );
        assert_eq!(
            serde_json::to_string(&StaffPosition::Employee).unwrap(),
            "\"employee\""
        );
    }
}
