//! Role-based creation quotas.
//!
//! Every quota-gated resource kind reads one limit column off the `roles`
//! table. A user's effective limit for a kind is the highest limit among the
//! roles they hold; a user holding no roles has no effective limit and is
//! denied outright.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::Role;

/// The resource kinds whose creation is gated by role limits.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuotaKind {
    /// Stores owned by the user.
    Stores,
    /// Products listed in a single store.
    Products,
    /// Managers staffing a single store.
    Managers,
    /// Employees staffing a single store.
    Employees,
}

impl QuotaKind {
    /// Returns the limit this kind reads from a single role.
    #[inline]
    pub fn limit_in(self, role: &Role) -> i32 {
        match self {
            QuotaKind::Stores => role.max_stores,
            QuotaKind::Products => role.max_products,
            QuotaKind::Managers => role.max_managers,
            QuotaKind::Employees => role.max_employees,
        }
    }

    /// Returns the effective limit across the given roles.
    ///
    /// The most permissive role wins. Returns `None` for an empty role set,
    /// which callers must treat as a denial.
    pub fn effective_limit(self, roles: &[Role]) -> Option<i64> {
        roles.iter().map(|role| self.limit_in(role) as i64).max()
    }

    /// Returns whether another resource of this kind may be created.
    ///
    /// Creation is denied exactly when `current_count` has reached the
    /// effective limit, or when no roles are held at all.
    pub fn admits(self, roles: &[Role], current_count: i64) -> bool {
        match self.effective_limit(roles) {
            Some(limit) => current_count < limit,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn role_with_limits(stores: i32, products: i32, managers: i32, employees: i32) -> Role {
        let now = jiff::Timestamp::now();
        Role {
            id: Uuid::new_v4(),
            name: format!("role-{}", Uuid::new_v4()),
            description: String::new(),
            max_stores: stores,
            max_products: products,
            max_managers: managers,
            max_employees: employees,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn most_permissive_role_wins() {
        let roles = vec![role_with_limits(5, 5, 5, 5), role_with_limits(10, 2, 3, 1)];

        assert_eq!(QuotaKind::Stores.effective_limit(&roles), Some(10));
        assert_eq!(QuotaKind::Products.effective_limit(&roles), Some(5));
        assert_eq!(QuotaKind::Managers.effective_limit(&roles), Some(5));
        assert_eq!(QuotaKind::Employees.effective_limit(&roles), Some(5));
    }

    #[test]
    fn denies_at_the_boundary() {
        let roles = vec![role_with_limits(5, 5, 5, 5)];

        assert!(QuotaKind::Stores.admits(&roles, 4));
        assert!(!QuotaKind::Stores.admits(&roles, 5));
        assert!(!QuotaKind::Stores.admits(&roles, 6));
    }

    #[test]
    fn empty_role_set_denies_everything() {
        let roles: Vec<Role> = vec![];

        assert_eq!(QuotaKind::Stores.effective_limit(&roles), None);
        assert!(!QuotaKind::Stores.admits(&roles, 0));
        assert!(!QuotaKind::Products.admits(&roles, 0));
    }

    #[test]
    fn zero_limit_denies_first_creation() {
        let roles = vec![role_with_limits(0, 0, 0, 0)];

        assert_eq!(QuotaKind::Products.effective_limit(&roles), Some(0));
        assert!(!QuotaKind::Products.admits(&roles, 0));
    }

    #[test]
    fn extra_role_can_only_widen_the_limit() {
        let base = vec![role_with_limits(5, 5, 5, 5)];
        let widened = vec![role_with_limits(5, 5, 5, 5), role_with_limits(10, 10, 10, 10)];

        assert!(!QuotaKind::Stores.admits(&base, 5));
        assert!(QuotaKind::Stores.admits(&widened, 5));
    }
}
