//! Handlers for reports about the application itself.
//!
//! Filing is open to every signed-in user and is the only piece of this
//! module on the authenticated router; reading, resolving, and deleting the
//! pile belong to administrators. Resolution is a conditional update that
//! flips the `solved` flag exactly once, so two administrators racing on the
//! same report cannot both win.

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use mercado_postgres::model::{AppReport, NewAppReport};
use mercado_postgres::query::{AppReportRepository, ResolveOutcome};
use mercado_postgres::types::OffsetPagination;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthProvider, AuthState, Json, Path, Query, ValidateJson};
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for application report operations.
const TRACING_TARGET: &str = "mercado::handler::app_reports";

/// Response with a single application report.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct AppReportResponse {
    /// ID of the report.
    pub report_id: Uuid,
    /// ID of the user who filed the report.
    pub author_id: Uuid,
    /// Short summary of the issue.
    pub title: String,
    /// Detailed description of the issue.
    pub description: String,
    /// URL of a supporting image, if attached.
    pub image_url: Option<String>,
    /// Whether an administrator has resolved the report.
    pub solved: bool,

    /// Timestamp when the report was filed.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    /// Timestamp when the report was last updated.
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

impl From<AppReport> for AppReportResponse {
    fn from(report: AppReport) -> Self {
        Self {
            report_id: report.id,
            author_id: report.author_id,
            title: report.title,
            description: report.description,
            image_url: report.image_url,
            solved: report.solved,
            created_at: report.created_at.into(),
            updated_at: report.updated_at.into(),
        }
    }
}

/// Request payload for filing an application report.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "title": "Store page times out",
    "description": "Opening any store page spins forever since this morning."
}))]
struct FileAppReportRequest {
    /// Short summary of the issue.
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    /// Detailed description of the issue.
    #[validate(length(min = 1, max = 4000))]
    pub description: String,
    /// URL of a supporting image.
    #[validate(length(min = 1, max = 2048))]
    pub image_url: Option<String>,
}

/// Files a report about the application.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/app/reports", tag = "reports",
    request_body(
        content = FileAppReportRequest,
        description = "The issue observed",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Invalid title or description",
            body = ErrorResponse,
        ),
        (
            status = UNAUTHORIZED,
            description = "Missing or invalid session token",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Report filed",
            body = AppReportResponse,
        ),
    ),
)]
async fn file_app_report(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    ValidateJson(request): ValidateJson<FileAppReportRequest>,
) -> Result<(StatusCode, Json<AppReportResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let new_report = NewAppReport {
        author_id: auth_state.user_id(),
        title: request.title,
        description: request.description,
        image_url: request.image_url,
    };

    let report = conn.file_app_report(new_report).await?;

    tracing::info!(
        target: TRACING_TARGET,
        report_id = %report.id,
        author_id = %report.author_id,
        "application report filed"
    );

    Ok((StatusCode::CREATED, Json(AppReportResponse::from(report))))
}

/// Filter and pagination parameters for the application report listing.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct AppReportFilter {
    /// Restrict the listing to solved or unsolved reports.
    pub solved: Option<bool>,
    /// The number of records to skip before starting to return results.
    pub offset: Option<u32>,
    /// The maximum number of records to return.
    pub limit: Option<u32>,
}

impl AppReportFilter {
    fn pagination(self) -> OffsetPagination {
        crate::handler::utils::PaginationRequest {
            offset: self.offset,
            limit: self.limit,
        }
        .into()
    }
}

/// Returns the application reports.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/app/reports", tag = "reports",
    params(AppReportFilter),
    responses(
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Application reports, newest first",
            body = Vec<AppReportResponse>,
        ),
    ),
)]
async fn list_app_reports(
    State(pg_client): State<PgClient>,
    _auth_state: AuthState,
    Query(filter): Query<AppReportFilter>,
) -> Result<(StatusCode, Json<Vec<AppReportResponse>>)> {
    let mut conn = pg_client.get_connection().await?;

    let reports = conn
        .list_app_reports(filter.solved, filter.pagination())
        .await?
        .into_iter()
        .map(AppReportResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(reports)))
}

/// Marks an application report as resolved.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    put, path = "/app/reports/{report_id}", tag = "reports",
    params(
        ("report_id" = Uuid, Path, description = "ID of the report"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Report not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Report is already resolved",
            body = ErrorResponse,
            example = json!({
                "name": "conflict",
                "message": "Report is already resolved",
                "resource": "report"
            })
        ),
        (
            status = OK,
            description = "Report resolved",
            body = AppReportResponse,
        ),
    ),
)]
async fn resolve_app_report(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(report_id): Path<Uuid>,
) -> Result<(StatusCode, Json<AppReportResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    match conn.resolve_app_report(report_id).await? {
        ResolveOutcome::Resolved(report) => {
            tracing::info!(
                target: TRACING_TARGET,
                report_id = %report.id,
                admin_id = %auth_state.user_id(),
                "application report resolved"
            );
            Ok((StatusCode::OK, Json(AppReportResponse::from(report))))
        }
        ResolveOutcome::AlreadySolved => Err(ErrorKind::Conflict
            .with_message("Report is already resolved")
            .with_resource("report")),
        ResolveOutcome::NotFound => Err(ErrorKind::NotFound.with_resource("report")),
    }
}

/// Deletes an application report.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/app/reports/{report_id}", tag = "reports",
    params(
        ("report_id" = Uuid, Path, description = "ID of the report"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Report not found",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Report deleted",
        ),
    ),
)]
async fn delete_app_report(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(report_id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;

    if !conn.delete_app_report(report_id).await? {
        return Err(ErrorKind::NotFound.with_resource("report"));
    }

    tracing::info!(
        target: TRACING_TARGET,
        report_id = %report_id,
        admin_id = %auth_state.user_id(),
        "application report deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with the routes available to any signed-in user.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(file_app_report))
}

/// Returns a [`Router`] with the administrator-only routes.
///
/// [`Router`]: axum::routing::Router
pub fn admin_routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list_app_reports))
        .routes(routes!(resolve_app_report, delete_app_report))
}

#[cfg(test)]
mod test {
    use axum_test::TestServer;

    use super::*;
    use crate::handler::test::{create_test_server, sign_in_root_admin, sign_up_account};

    async fn file_report(server: &TestServer, token: &str) -> AppReportResponse {
        let request = FileAppReportRequest {
            title: "Store page times out".to_string(),
            description: "Opening any store page spins forever.".to_string(),
            image_url: None,
        };
        let response = server
            .post("/app/reports")
            .authorization_bearer(token)
            .json(&request)
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    #[tokio::test]
    async fn anyone_signed_in_files_app_reports() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;

        let report = file_report(&server, &account.access_token).await;
        assert_eq!(report.author_id, account.user_id);
        assert!(!report.solved);

        Ok(())
    }

    #[tokio::test]
    async fn resolution_happens_exactly_once() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;
        let admin = sign_in_root_admin(&server).await?;

        let report = file_report(&server, &account.access_token).await;

        let path = format!("/app/reports/{}", report.report_id);

        let response = server
            .put(&path)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_ok();
        let resolved: AppReportResponse = response.json();
        assert!(resolved.solved);

        let response = server
            .put(&path)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn solved_filter_tracks_resolution() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;
        let admin = sign_in_root_admin(&server).await?;

        let report = file_report(&server, &account.access_token).await;

        let response = server
            .get("/app/reports")
            .add_query_param("solved", false)
            .add_query_param("limit", 50)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_ok();
        let open: Vec<AppReportResponse> = response.json();
        assert!(open.iter().any(|entry| entry.report_id == report.report_id));

        let response = server
            .put(&format!("/app/reports/{}", report.report_id))
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_ok();

        let response = server
            .get("/app/reports")
            .add_query_param("solved", true)
            .add_query_param("limit", 50)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_ok();
        let solved: Vec<AppReportResponse> = response.json();
        assert!(
            solved
                .iter()
                .any(|entry| entry.report_id == report.report_id)
        );

        Ok(())
    }

    #[tokio::test]
    async fn regular_users_stay_out_of_the_pile() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;

        let response = server
            .get("/app/reports")
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn deleted_reports_stay_gone() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;
        let admin = sign_in_root_admin(&server).await?;

        let report = file_report(&server, &account.access_token).await;
        let path = format!("/app/reports/{}", report.report_id);

        let response = server
            .delete(&path)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server
            .delete(&path)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_not_found();

        Ok(())
    }
}
