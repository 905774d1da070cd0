//! Application report repository with one-shot resolution.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{AppReport, NewAppReport};
use crate::types::OffsetPagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Outcome of resolving an application report.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// The report was open and is now solved.
    Resolved(AppReport),
    /// The report was already solved. Nothing changed.
    AlreadySolved,
    /// No such report.
    NotFound,
}

/// Repository for application report database operations.
///
/// Any user may file an application report; administrators review, resolve,
/// and delete them. Resolution flips the `solved` flag through a conditional
/// update that only matches open reports, so the flag flips exactly once no
/// matter how many resolutions race.
pub trait AppReportRepository {
    /// Files a new application report.
    fn file_app_report(
        &mut self,
        report: NewAppReport,
    ) -> impl Future<Output = PgResult<AppReport>> + Send;

    /// Lists application reports, newest first, optionally filtered by
    /// resolution state.
    fn list_app_reports(
        &mut self,
        solved: Option<bool>,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<AppReport>>> + Send;

    /// Marks an open report as solved.
    ///
    /// The update only matches open rows; a second resolution finds nothing
    /// to do and reports the state it found instead.
    fn resolve_app_report(
        &mut self,
        report_id: Uuid,
    ) -> impl Future<Output = PgResult<ResolveOutcome>> + Send;

    /// Deletes a report.
    ///
    /// Returns whether a row was removed.
    fn delete_app_report(
        &mut self,
        report_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl AppReportRepository for PgConnection {
    async fn file_app_report(&mut self, report: NewAppReport) -> PgResult<AppReport> {
        use schema::app_reports;

        diesel::insert_into(app_reports::table)
            .values(&report)
            .returning(AppReport::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_app_reports(
        &mut self,
        solved: Option<bool>,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<AppReport>> {
        use schema::app_reports::{self, dsl};

        let mut query = app_reports::table.into_boxed();

        if let Some(solved) = solved {
            query = query.filter(dsl::solved.eq(solved));
        }

        query
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(AppReport::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn resolve_app_report(&mut self, report_id: Uuid) -> PgResult<ResolveOutcome> {
        use schema::app_reports::{self, dsl};

        let resolved = diesel::update(
            app_reports::table
                .filter(dsl::id.eq(report_id))
                .filter(dsl::solved.eq(false)),
        )
        .set(dsl::solved.eq(true))
        .returning(AppReport::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)?;

        if let Some(report) = resolved {
            return Ok(ResolveOutcome::Resolved(report));
        }

        let exists: i64 = app_reports::table
            .filter(dsl::id.eq(report_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(if exists > 0 {
            ResolveOutcome::AlreadySolved
        } else {
            ResolveOutcome::NotFound
        })
    }

    async fn delete_app_report(&mut self, report_id: Uuid) -> PgResult<bool> {
        use schema::app_reports::{self, dsl};

        let deleted = diesel::delete(app_reports::table.filter(dsl::id.eq(report_id)))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
