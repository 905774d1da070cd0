//! Role assignment rows linking users to roles.

use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::user_roles;

/// Data for assigning a role to a user.
///
/// Assignment rows are created and deleted whole; there is nothing on them
/// to update, and reads go through the joined [`Role`] rows instead.
///
/// [`Role`]: crate::model::Role
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = user_roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUserRole {
    /// The user to assign the role to.
    pub user_id: Uuid,
    /// The role to assign.
    pub role_id: Uuid,
}
