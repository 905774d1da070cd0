//! Product repository with quota-gated creation and atomic sales.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use super::QuotaOutcome;
use crate::model::{NewProduct, Product, Role, UpdateProduct};
use crate::types::{OffsetPagination, QuotaKind};
use crate::{PgConnection, PgError, PgResult, schema};

/// Outcome of recording a sale.
#[derive(Debug, Clone, PartialEq)]
pub enum SaleOutcome {
    /// One unit was sold; the row reflects the moved counters.
    Sold(Product),
    /// The product exists but has no stock left. Nothing changed.
    OutOfStock,
    /// No such product in the store.
    NotFound,
}

/// Repository for product database operations.
///
/// Product creation is bounded per store by the owner's `max_products`
/// quota. A sale moves `stock` and `sold_count` together in one conditional
/// update, so the two counters cannot drift apart and stock never goes
/// negative under concurrent sales.
pub trait ProductRepository {
    /// Creates a product if the store owner's quota admits one more.
    ///
    /// Looks up the store's owner, locks the owner's user row, recounts the
    /// products in that store, and inserts only when the count is below the
    /// owner's effective `max_products` limit.
    fn create_product_within_quota(
        &mut self,
        new_product: NewProduct,
    ) -> impl Future<Output = PgResult<QuotaOutcome<Product>>> + Send;

    /// Finds a product within a store.
    ///
    /// The store filter keeps one store's product ids from resolving under
    /// another store's path.
    fn find_store_product(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Product>>> + Send;

    /// Lists the products of a store ordered by creation time.
    fn list_store_products(
        &mut self,
        store_id: Uuid,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Product>>> + Send;

    /// Updates a product's listing fields, including restocking.
    ///
    /// Returns `None` when the product does not exist in the store.
    fn update_product(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
        changes: UpdateProduct,
    ) -> impl Future<Output = PgResult<Option<Product>>> + Send;

    /// Deletes a product, cascading its reports.
    ///
    /// Returns whether a row was removed.
    fn delete_product(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Records the sale of one unit.
    ///
    /// Decrements `stock` and increments `sold_count` in a single update
    /// that only matches rows with stock remaining. When no row matches,
    /// the product is re-checked to tell an exhausted product apart from a
    /// missing one.
    fn record_sale(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
    ) -> impl Future<Output = PgResult<SaleOutcome>> + Send;
}

impl ProductRepository for PgConnection {
    async fn create_product_within_quota(
        &mut self,
        mut new_product: NewProduct,
    ) -> PgResult<QuotaOutcome<Product>> {
        use schema::{products, roles, stores, user_roles, users};

        new_product.name = new_product.name.trim().to_owned();

        self.build_transaction()
            .run(|conn| {
                async move {
                    let owner_id: Uuid = stores::table
                        .find(new_product.store_id)
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

                    let listed: i64 = products::table
                        .filter(products::store_id.eq(new_product.store_id))
                        .count()
                        .get_result(conn)
                        .await?;

                    if !QuotaKind::Products.admits(&owner_roles, listed) {
                        return Ok(match QuotaKind::Products.effective_limit(&owner_roles) {
                            Some(limit) => QuotaOutcome::LimitReached { limit },
                            None => QuotaOutcome::MissingRoles,
                        });
                    }

                    let product = diesel::insert_into(products::table)
                        .values(&new_product)
                        .returning(Product::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok::<QuotaOutcome<Product>, PgError>(QuotaOutcome::Created(product))
                }
                .scope_boxed()
            })
            .await
    }

    async fn find_store_product(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
    ) -> PgResult<Option<Product>> {
        use schema::products::{self, dsl};

        products::table
            .filter(dsl::id.eq(product_id))
            .filter(dsl::store_id.eq(store_id))
            .select(Product::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_store_products(
        &mut self,
        store_id: Uuid,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<Product>> {
        use schema::products::{self, dsl};

        products::table
            .filter(dsl::store_id.eq(store_id))
            .order(dsl::created_at.asc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Product::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn update_product(
        &mut self,
        store_id: Uuid,
        product_id: Uuid,
        mut changes: UpdateProduct,
    ) -> PgResult<Option<Product>> {
        use schema::products::{self, dsl};

        if let Some(name) = changes.name.as_mut() {
            *name = name.trim().to_owned();
        }

        diesel::update(
            products::table
                .filter(dsl::id.eq(product_id))
                .filter(dsl::store_id.eq(store_id)),
        )
        .set(&changes)
        .returning(Product::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)
    }

    async fn delete_product(&mut self, store_id: Uuid, product_id: Uuid) -> PgResult<bool> {
        use schema::products::{self, dsl};

        let deleted = diesel::delete(
            products::table
                .filter(dsl::id.eq(product_id))
                .filter(dsl::store_id.eq(store_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }

    async fn record_sale(&mut self, store_id: Uuid, product_id: Uuid) -> PgResult<SaleOutcome> {
        use schema::products::{self, dsl};

        let sold = diesel::update(
            products::table
                .filter(dsl::id.eq(product_id))
                .filter(dsl::store_id.eq(store_id))
                .filter(dsl::stock.gt(0)),
        )
        .set((
            dsl::stock.eq(dsl::stock - 1),
            dsl::sold_count.eq(dsl::sold_count + 1),
        ))
        .returning(Product::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)?;

        if let Some(product) = sold {
            return Ok(SaleOutcome::Sold(product));
        }

        let exists: i64 = products::table
            .filter(dsl::id.eq(product_id))
            .filter(dsl::store_id.eq(store_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(if exists > 0 {
            SaleOutcome::OutOfStock
        } else {
            SaleOutcome::NotFound
        })
    }
}
