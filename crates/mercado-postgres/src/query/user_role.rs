//! Role assignment repository linking users to roles.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::model::{NewUserRole, Role};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for user-role assignment database operations.
///
/// Assignments are whole rows in `user_roles`; they carry no state of their
/// own beyond the link. Administrators reassign a user's set wholesale, and
/// the quota evaluators read the assigned roles through
/// [`list_roles_for_user`](UserRoleRepository::list_roles_for_user).
pub trait UserRoleRepository {
    /// Lists the roles a user holds, ordered by name.
    fn list_roles_for_user(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<Role>>> + Send;

    /// Replaces a user's role set wholesale.
    ///
    /// Removes every current assignment and assigns exactly the given roles.
    /// Returns the new role set, or `None` when any of the given ids does
    /// not name an existing role, in which case nothing is changed.
    fn replace_user_roles(
        &mut self,
        user_id: Uuid,
        role_ids: Vec<Uuid>,
    ) -> impl Future<Output = PgResult<Option<Vec<Role>>>> + Send;
}

impl UserRoleRepository for PgConnection {
    async fn list_roles_for_user(&mut self, user_id: Uuid) -> PgResult<Vec<Role>> {
        use schema::{roles, user_roles};

        user_roles::table
            .inner_join(roles::table)
            .filter(user_roles::user_id.eq(user_id))
            .select(Role::as_select())
            .order(roles::name.asc())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn replace_user_roles(
        &mut self,
        user_id: Uuid,
        mut role_ids: Vec<Uuid>,
    ) -> PgResult<Option<Vec<Role>>> {
        use schema::{roles, user_roles};

        role_ids.sort_unstable();
        role_ids.dedup();

        self.build_transaction()
            .run(|conn| {
                async move {
                    let matched: Vec<Role> = roles::table
                        .filter(roles::id.eq_any(&role_ids))
                        .select(Role::as_select())
                        .order(roles::name.asc())
                        .load(conn)
                        .await?;
                    if matched.len() != role_ids.len() {
                        return Ok(None);
                    }

                    diesel::delete(
                        user_roles::table.filter(user_roles::user_id.eq(user_id)),
                    )
                    .execute(conn)
                    .await?;

                    let assignments: Vec<NewUserRole> = role_ids
                        .iter()
                        .map(|&role_id| NewUserRole { user_id, role_id })
                        .collect();
                    if !assignments.is_empty() {
                        diesel::insert_into(user_roles::table)
                            .values(&assignments)
                            .execute(conn)
                            .await?;
                    }

                    Ok::<Option<Vec<Role>>, PgError>(Some(matched))
                }
                .scope_boxed()
            })
            .await
    }
}
