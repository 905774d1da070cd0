//! Store repository with quota-gated creation.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use super::QuotaOutcome;
use crate::model::{NewStore, Role, Store, UpdateStore};
use crate::types::{OffsetPagination, QuotaKind, StaffPosition};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for store database operations.
///
/// Store creation is bounded by the owner's `max_stores` quota; the check
/// and the insert run inside one transaction holding a lock on the owner's
/// user row. Deleting a store cascades its staff, products, and reports
/// through the schema's foreign keys.
pub trait StoreRepository {
    /// Creates a store if the owner's quota admits one more.
    ///
    /// Locks the owner's user row, recounts the stores they own, and inserts
    /// only when the count is below the owner's effective `max_stores`
    /// limit. Racing creations for the same owner serialize on the row lock.
    fn create_store_within_quota(
        &mut self,
        new_store: NewStore,
    ) -> impl Future<Output = PgResult<QuotaOutcome<Store>>> + Send;

    /// Finds a store by its unique identifier.
    fn find_store_by_id(
        &mut self,
        store_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Store>>> + Send;

    /// Lists all stores ordered by creation time, most recent first.
    fn list_stores(
        &mut self,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Store>>> + Send;

    /// Lists the stores a user owns.
    fn list_stores_owned_by(
        &mut self,
        owner_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<Store>>> + Send;

    /// Lists the stores where a user holds the given staff position.
    fn list_stores_staffed_by(
        &mut self,
        user_id: Uuid,
        position: StaffPosition,
    ) -> impl Future<Output = PgResult<Vec<Store>>> + Send;

    /// Updates a store's name or image.
    ///
    /// Returns `None` when the store does not exist.
    fn update_store(
        &mut self,
        store_id: Uuid,
        changes: UpdateStore,
    ) -> impl Future<Output = PgResult<Option<Store>>> + Send;

    /// Deletes a store, cascading its staff, products, and reports.
    ///
    /// Returns whether a row was removed.
    fn delete_store(&mut self, store_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;
}

impl StoreRepository for PgConnection {
    async fn create_store_within_quota(
        &mut self,
        mut new_store: NewStore,
    ) -> PgResult<QuotaOutcome<Store>> {
        use schema::{roles, stores, user_roles, users};

        new_store.name = new_store.name.trim().to_owned();

        self.build_transaction()
            .run(|conn| {
                async move {
                    // Serializes quota evaluation for this owner.
                    users::table
                        .find(new_store.author_id)
                        .select(users::id)
                        .for_update()
                        .first::<Uuid>(conn)
                        .await?;

                    let owner_roles: Vec<Role> = user_roles::table
                        .inner_join(roles::table)
                        .filter(user_roles::user_id.eq(new_store.author_id))
                        .select(Role::as_select())
                        .load(conn)
                        .await?;

                    let owned: i64 = stores::table
                        .filter(stores::author_id.eq(new_store.author_id))
                        .count()
                        .get_result(conn)
                        .await?;

                    if !QuotaKind::Stores.admits(&owner_roles, owned) {
                        return Ok(match QuotaKind::Stores.effective_limit(&owner_roles) {
                            Some(limit) => QuotaOutcome::LimitReached { limit },
                            None => QuotaOutcome::MissingRoles,
                        });
                    }

                    let store = diesel::insert_into(stores::table)
                        .values(&new_store)
                        .returning(Store::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok::<QuotaOutcome<Store>, PgError>(QuotaOutcome::Created(store))
                }
                .scope_boxed()
            })
            .await
    }

    async fn find_store_by_id(&mut self, store_id: Uuid) -> PgResult<Option<Store>> {
        use schema::stores::{self, dsl};

        stores::table
            .filter(dsl::id.eq(store_id))
            .select(Store::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_stores(&mut self, pagination: OffsetPagination) -> PgResult<Vec<Store>> {
        use schema::stores::{self, dsl};

        stores::table
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Store::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_stores_owned_by(&mut self, owner_id: Uuid) -> PgResult<Vec<Store>> {
        use schema::stores::{self, dsl};

        stores::table
            .filter(dsl::author_id.eq(owner_id))
            .order(dsl::created_at.asc())
            .select(Store::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_stores_staffed_by(
        &mut self,
        user_id: Uuid,
        position: StaffPosition,
    ) -> PgResult<Vec<Store>> {
        use schema::{store_staff, stores};

        store_staff::table
            .inner_join(stores::table)
            .filter(store_staff::user_id.eq(user_id))
            .filter(store_staff::position.eq(position))
            .select(Store::as_select())
            .order(stores::created_at.asc())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_store(
        &mut self,
        store_id: Uuid,
        mut changes: UpdateStore,
    ) -> PgResult<Option<Store>> {
        use schema::stores::{self, dsl};

        if let Some(name) = changes.name.as_mut() {
            *name = name.trim().to_owned();
        }

        diesel::update(stores::table.filter(dsl::id.eq(store_id)))
            .set(&changes)
            .returning(Store::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn delete_store(&mut self, store_id: Uuid) -> PgResult<bool> {
        use schema::stores::{self, dsl};

        let deleted = diesel::delete(stores::table.filter(dsl::id.eq(store_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
