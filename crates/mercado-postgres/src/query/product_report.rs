//! Product report repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewProductReport, ProductReport};
use crate::types::OffsetPagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for product report database operations.
///
/// Reports are immutable once filed; the lifecycle is file, read, delete.
/// They disappear with their store or product through the schema's cascade
/// rules, never leaving orphans behind.
pub trait ProductReportRepository {
    /// Files a new report against a product.
    fn file_product_report(
        &mut self,
        report: NewProductReport,
    ) -> impl Future<Output = PgResult<ProductReport>> + Send;

    /// Lists the reports filed against a store's products, newest first.
    fn list_store_reports(
        &mut self,
        store_id: Uuid,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<ProductReport>>> + Send;

    /// Deletes a report from a store.
    ///
    /// Returns whether a row was removed.
    fn delete_product_report(
        &mut self,
        store_id: Uuid,
        report_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl ProductReportRepository for PgConnection {
    async fn file_product_report(
        &mut self,
        report: NewProductReport,
    ) -> PgResult<ProductReport> {
        use schema::product_reports;

        diesel::insert_into(product_reports::table)
            .values(&report)
            .returning(ProductReport::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_store_reports(
        &mut self,
        store_id: Uuid,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<ProductReport>> {
        use schema::product_reports::{self, dsl};

        product_reports::table
            .filter(dsl::store_id.eq(store_id))
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(ProductReport::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_product_report(
        &mut self,
        store_id: Uuid,
        report_id: Uuid,
    ) -> PgResult<bool> {
        use schema::product_reports::{self, dsl};

        let deleted = diesel::delete(
            product_reports::table
                .filter(dsl::id.eq(report_id))
                .filter(dsl::store_id.eq(store_id)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
