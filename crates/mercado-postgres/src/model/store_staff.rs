//! Staff membership rows linking users to stores.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::store_staff;
use crate::types::StaffPosition;

/// A staff position held by a user at a store.
///
/// The composite primary key keeps a user to a single position per store;
/// changing a position means removing the row and granting a new one.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = store_staff)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoreStaff {
    /// The store the position belongs to.
    pub store_id: Uuid,
    /// The user holding the position.
    pub user_id: Uuid,
    /// Whether the user is a manager or an employee.
    pub position: StaffPosition,
    /// Timestamp when the position was granted.
    pub created_at: Timestamp,
}

/// Data for adding a user to a store's staff.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = store_staff)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewStoreStaff {
    /// The store the position belongs to.
    pub store_id: Uuid,
    /// The user to add.
    pub user_id: Uuid,
    /// The position to grant.
    pub position: StaffPosition,
}
