//! Role registry repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::model::{NewRole, Role, UpdateRole};
use crate::types::OffsetPagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Limit granted to the starter role seeded on an empty registry.
pub const STARTER_ROLE_LIMIT: i32 = 5;

/// Limit granted to the upgraded role seeded on an empty registry.
pub const UPGRADED_ROLE_LIMIT: i32 = 10;

/// Repository for role registry database operations.
///
/// Roles are named bundles of creation limits maintained by administrators.
/// Deleting a role cascades its assignments, so no user can be left holding
/// a reference to a role that no longer exists.
pub trait RoleRepository {
    /// Creates a new role.
    ///
    /// The name is stored trimmed; a duplicate name surfaces as a uniqueness
    /// violation.
    fn create_role(&mut self, new_role: NewRole) -> impl Future<Output = PgResult<Role>> + Send;

    /// Finds a role by its unique name.
    fn find_role_by_name(
        &mut self,
        role_name: &str,
    ) -> impl Future<Output = PgResult<Option<Role>>> + Send;

    /// Lists roles ordered by name.
    fn list_roles(
        &mut self,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Role>>> + Send;

    /// Replaces a role's name, description, and limits.
    ///
    /// Returns `None` when the role does not exist.
    fn update_role(
        &mut self,
        role_id: Uuid,
        changes: UpdateRole,
    ) -> impl Future<Output = PgResult<Option<Role>>> + Send;

    /// Deletes a role unconditionally, cascading its assignments.
    ///
    /// Returns whether a row was removed.
    fn delete_role(&mut self, role_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;

    /// Seeds the two default shop roles when the registry is empty.
    ///
    /// Inserts `shop_level1` (all limits at [`STARTER_ROLE_LIMIT`]) and
    /// `shop_level2` (all limits at [`UPGRADED_ROLE_LIMIT`]). Returns the
    /// seeded roles, or an empty vector when the registry already has
    /// content and nothing was done.
    fn seed_default_roles(&mut self) -> impl Future<Output = PgResult<Vec<Role>>> + Send;
}

impl RoleRepository for PgConnection {
    async fn create_role(&mut self, mut new_role: NewRole) -> PgResult<Role> {
        use schema::roles;

        new_role.name = new_role.name.trim().to_owned();

        diesel::insert_into(roles::table)
            .values(&new_role)
            .returning(Role::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_role_by_name(&mut self, role_name: &str) -> PgResult<Option<Role>> {
        use schema::roles::{self, dsl};

        roles::table
            .filter(dsl::name.eq(role_name.trim()))
            .select(Role::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_roles(&mut self, pagination: OffsetPagination) -> PgResult<Vec<Role>> {
        use schema::roles::{self, dsl};

        roles::table
            .order(dsl::name.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Role::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_role(&mut self, role_id: Uuid, mut changes: UpdateRole) -> PgResult<Option<Role>> {
        use schema::roles::{self, dsl};

        changes.name = changes.name.trim().to_owned();

        diesel::update(roles::table.filter(dsl::id.eq(role_id)))
            .set(&changes)
            .returning(Role::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn delete_role(&mut self, role_id: Uuid) -> PgResult<bool> {
        use schema::roles::{self, dsl};

        let deleted = diesel::delete(roles::table.filter(dsl::id.eq(role_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    async fn seed_default_roles(&mut self) -> PgResult<Vec<Role>> {
        use schema::roles;

        self.build_transaction()
            .run(|conn| {
                async move {
                    let existing: i64 = roles::table.count().get_result(conn).await?;
                    if existing > 0 {
                        return Ok(Vec::new());
                    }

                    let defaults = vec![
                        NewRole::with_uniform_limits("shop_level1", STARTER_ROLE_LIMIT),
                        NewRole::with_uniform_limits("shop_level2", UPGRADED_ROLE_LIMIT),
                    ];

                    let seeded = diesel::insert_into(roles::table)
                        .values(&defaults)
                        .on_conflict_do_nothing()
                        .returning(Role::as_returning())
                        .get_results(conn)
                        .await?;

                    Ok::<Vec<Role>, PgError>(seeded)
                }
                .scope_boxed()
            })
            .await
    }
}
