//! Staff membership repository with quota-gated hiring.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use super::QuotaOutcome;
use crate::model::{NewStoreStaff, Role, StoreStaff, User};
use crate::types::StaffPosition;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for store staff database operations.
///
/// Staffing is bounded per store by the owner's `max_managers` and
/// `max_employees` quotas, always read off the owner's roles regardless of
/// who performs the hire. A user holds at most one position per store,
/// enforced by the table's composite primary key.
pub trait StoreStaffRepository {
    /// Adds a staff member if the store owner's quota admits one more.
    ///
    /// Looks up the store's owner, locks the owner's user row, recounts the
    /// staff holding the same position in that store, and inserts only when
    /// the count is below the owner's effective limit for the position.
    /// Hiring someone who is already staff surfaces as a uniqueness
    /// violation on the membership key.
    fn add_staff_within_quota(
        &mut self,
        new_staff: NewStoreStaff,
    ) -> impl Future<Output = PgResult<QuotaOutcome<StoreStaff>>> + Send;

    /// Gets a user's position in a store for permission checking.
    ///
    /// Returns the position if the user is staff, `None` otherwise.
    fn staff_position(
        &mut self,
        store_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<StaffPosition>>> + Send;

    /// Lists the staff of a store holding a position, with their user rows.
    fn list_staff_with_users(
        &mut self,
        store_id: Uuid,
        position: StaffPosition,
    ) -> impl Future<Output = PgResult<Vec<(StoreStaff, User)>>> + Send;

    /// Removes a staff member holding the given position.
    ///
    /// The position filter keeps the manager and employee removal paths
    /// from reaching across each other. Returns whether a row was removed.
    fn remove_staff(
        &mut self,
        store_id: Uuid,
        user_id: Uuid,
        position: StaffPosition,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl StoreStaffRepository for PgConnection {
    async fn add_staff_within_quota(
        &mut self,
        new_staff: NewStoreStaff,
    ) -> PgResult<QuotaOutcome<StoreStaff>> {
        use schema::{roles, store_staff, stores, user_roles, users};

        let kind = new_staff.position.quota_kind();

        self.build_transaction()
            .run(|conn| {
                async move {
                    let owner_id: Uuid = stores::table
                        .find(new_staff.store_id)
                        .select(stores::author_id)
                        .first(conn)
                        .await?;

                    // Serializes quota evaluation for this owner.
                    users::table
                        .find(owner_id)
                        .select(users::id)
                        .for_update()
                        .first::<Uuid>(conn)
                        .await?;

                    let owner_roles: Vec<Role> = user_roles::table
                        .inner_join(roles::table)
                        .filter(user_roles::user_id.eq(owner_id))
                        .select(Role::as_select())
                        .load(conn)
                        .await?;

                    let staffed: i64 = store_staff::table
                        .filter(store_staff::store_id.eq(new_staff.store_id))
                        .filter(store_staff::position.eq(new_staff.position))
                        .count()
                        .get_result(conn)
                        .await?;

                    if !kind.admits(&owner_roles, staffed) {
                        return Ok(match kind.effective_limit(&owner_roles) {
                            Some(limit) => QuotaOutcome::LimitReached { limit },
                            None => QuotaOutcome::MissingRoles,
                        });
                    }

                    let staff = diesel::insert_into(store_staff::table)
                        .values(&new_staff)
                        .returning(StoreStaff::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok::<QuotaOutcome<StoreStaff>, PgError>(QuotaOutcome::Created(staff))
                }
                .scope_boxed()
            })
            .await
    }

    async fn staff_position(
        &mut self,
        store_id: Uuid,
        user_id: Uuid,
    ) -> PgResult<Option<StaffPosition>> {
        use schema::store_staff::{self, dsl};

        store_staff::table
            .filter(dsl::store_id.eq(store_id))
            .filter(dsl::user_id.eq(user_id))
            .select(dsl::position)
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_staff_with_users(
        &mut self,
        store_id: Uuid,
        position: StaffPosition,
    ) -> PgResult<Vec<(StoreStaff, User)>> {
        use schema::{store_staff, users};

        store_staff::table
            .inner_join(users::table)
            .filter(store_staff::store_id.eq(store_id))
            .filter(store_staff::position.eq(position))
            .select((StoreStaff::as_select(), User::as_select()))
            .order(store_staff::created_at.asc())
            .load::<(StoreStaff, User)>(self)
            .await
            .map_err(PgError::from)
    }

    async fn remove_staff(
        &mut self,
        store_id: Uuid,
        user_id: Uuid,
        position: StaffPosition,
    ) -> PgResult<bool> {
        use schema::store_staff::{self, dsl};

        let removed = diesel::delete(
            store_staff::table
                .filter(dsl::store_id.eq(store_id))
                .filter(dsl::user_id.eq(user_id))
                .filter(dsl::position.eq(position)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(removed > 0)
    }
}
