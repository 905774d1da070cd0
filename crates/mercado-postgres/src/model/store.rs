//! Store model for the marketplace.
//!
//! A store is owned by its author. Staff membership lives in the separate
//! `store_staff` table; products and product reports cascade away with the
//! store.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::stores;

/// A store owned by a user.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = stores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Store {
    /// Unique store identifier.
    pub id: Uuid,
    /// The user who owns this store.
    pub author_id: Uuid,
    /// Unique store name (3-30 characters).
    pub name: String,
    /// URL to the store's image.
    pub image_url: String,
    /// Timestamp when the store was created.
    pub created_at: Timestamp,
    /// Timestamp when the store was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating a new store.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = stores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewStore {
    /// The user who owns this store.
    pub author_id: Uuid,
    /// Unique store name (3-30 characters).
    pub name: String,
    /// URL to the store's image.
    pub image_url: String,
}

/// Data for updating a store.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = stores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateStore {
    /// Unique store name.
    pub name: Option<String>,
    /// URL to the store's image.
    pub image_url: Option<String>,
}

impl Store {
    /// Returns whether the given user owns this store.
    #[inline]
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}
