//! Role model carrying per-kind creation limits.
//!
//! Roles are assigned to users and gate how many stores, products, managers,
//! and employees a user may create. A limit of zero means the role grants no
//! creations of that kind; the effective limit across several roles is the
//! maximum, evaluated by [`QuotaKind`].
//!
//! [`QuotaKind`]: crate::types::QuotaKind

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::roles;

/// A named bundle of creation limits.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,
    /// Unique role name (2-64 characters).
    pub name: String,
    /// Free-form description of what the role is for.
    pub description: String,
    /// Maximum number of stores a holder may own.
    pub max_stores: i32,
    /// Maximum number of products per store the holder owns.
    pub max_products: i32,
    /// Maximum number of managers per store the holder owns.
    pub max_managers: i32,
    /// Maximum number of employees per store the holder owns.
    pub max_employees: i32,
    /// Timestamp when the role was created.
    pub created_at: Timestamp,
    /// Timestamp when the role was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new role.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRole {
    /// Unique role name (2-64 characters).
    pub name: String,
    /// Free-form description of what the role is for.
    pub description: String,
    /// Maximum number of stores a holder may own.
    pub max_stores: i32,
    /// Maximum number of products per store the holder owns.
    pub max_products: i32,
    /// Maximum number of managers per store the holder owns.
    pub max_managers: i32,
    /// Maximum number of employees per store the holder owns.
    pub max_employees: i32,
}

/// Replacement definition for an existing role.
///
/// Role updates are wholesale: every column is written, so the caller
/// supplies the complete bundle rather than a patch.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateRole {
    /// Unique role name (2-64 characters).
    pub name: String,
    /// Free-form description of what the role is for.
    pub description: String,
    /// Maximum number of stores a holder may own.
    pub max_stores: i32,
    /// Maximum number of products per store the holder owns.
    pub max_products: i32,
    /// Maximum number of managers per store the holder owns.
    pub max_managers: i32,
    /// Maximum number of employees per store the holder owns.
    pub max_employees: i32,
}

impl NewRole {
    /// Creates a role with the same limit for every kind.
    pub fn with_uniform_limits(name: impl Into<String>, limit: i32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            max_stores: limit,
            max_products: limit,
            max_managers: limit,
            max_employees: limit,
        }
    }
}
