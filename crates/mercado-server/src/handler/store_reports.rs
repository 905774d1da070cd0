//! Handlers for reports filed against a store's products.
//!
//! Any staff member can flag a product; reading and dismissing the pile is
//! manager work. Reports are immutable once filed. They reference a live
//! product, and deleting the product or the store cascades them away.

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use mercado_postgres::model::{NewProductReport, ProductReport};
use mercado_postgres::query::{ProductReportRepository, ProductRepository};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthProvider, AuthState, Json, Path, Query, StorePermission, ValidateJson};
use crate::handler::utils::PaginationRequest;
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for product report operations.
const TRACING_TARGET: &str = "mercado::handler::store_reports";

/// Response with a single product report.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct StoreReportResponse {
    /// ID of the report.
    pub report_id: Uuid,
    /// ID of the store the reported product belongs to.
    pub store_id: Uuid,
    /// ID of the reported product.
    pub product_id: Uuid,
    /// ID of the user who filed the report.
    pub author_id: Uuid,
    /// Short summary of the issue.
    pub title: String,
    /// Detailed description of the issue.
    pub description: String,
    /// URL of a supporting image, if attached.
    pub image_url: Option<String>,

    /// Timestamp when the report was filed.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
}

impl From<ProductReport> for StoreReportResponse {
    fn from(report: ProductReport) -> Self {
        Self {
            report_id: report.id,
            store_id: report.store_id,
            product_id: report.product_id,
            author_id: report.author_id,
            title: report.title,
            description: report.description,
            image_url: report.image_url,
            created_at: report.created_at.into(),
        }
    }
}

/// Returns the reports filed against the store's products.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/stores/{store_id}/reports", tag = "reports",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
        PaginationRequest,
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Only the owner, managers, and administrators read reports",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "The store's product reports, newest first",
            body = Vec<StoreReportResponse>,
        ),
    ),
)]
async fn list_store_reports(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
    Query(pagination): Query<PaginationRequest>,
) -> Result<(StatusCode, Json<Vec<StoreReportResponse>>)> {
    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ViewReports)
        .await?;

    let reports = conn
        .list_store_reports(store_id, pagination.into())
        .await?
        .into_iter()
        .map(StoreReportResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(reports)))
}

/// Request payload for filing a product report.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "productId": "0193b2a0-5a44-7f03-8c11-6d1e0c2b9f21",
    "title": "Damaged packaging",
    "description": "Three units arrived with torn boxes."
}))]
struct FileStoreReportRequest {
    /// ID of the product the report is about.
    pub product_id: Uuid,
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

/// Files a report against one of the store's products.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/stores/{store_id}/reports", tag = "reports",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
    ),
    request_body(
        content = FileStoreReportRequest,
        description = "The product and the issue observed",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Invalid title or description",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "Only the store's staff files reports here",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found, or the product is not listed in it",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Report filed",
            body = StoreReportResponse,
        ),
    ),
)]
async fn file_store_report(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
    ValidateJson(request): ValidateJson<FileStoreReportRequest>,
) -> Result<(StatusCode, Json<StoreReportResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        store_id = %store_id,
        product_id = %request.product_id,
        "report filing attempt"
    );

    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::FileReports)
        .await?;

    // Reports only make sense against a product that is actually listed in
    // this store.
    if conn
        .find_store_product(store_id, request.product_id)
        .await?
        .is_none()
    {
        return Err(ErrorKind::NotFound
            .with_message("No such product in this store")
            .with_resource("product"));
    }

    let new_report = NewProductReport {
        store_id,
        product_id: request.product_id,
        author_id: auth_state.user_id(),
        title: request.title,
        description: request.description,
        image_url: request.image_url,
    };

    let report = conn.file_product_report(new_report).await?;

    tracing::info!(
        target: TRACING_TARGET,
        report_id = %report.id,
        store_id = %store_id,
        product_id = %report.product_id,
        "product report filed"
    );

    Ok((
        StatusCode::CREATED,
        Json(StoreReportResponse::from(report)),
    ))
}

/// Dismisses a product report.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/stores/{store_id}/reports/{report_id}", tag = "reports",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
        ("report_id" = Uuid, Path, description = "ID of the report"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Only the owner, managers, and administrators dismiss reports",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store or report not found",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Report dismissed",
        ),
    ),
)]
async fn delete_store_report(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path((store_id, report_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ManageReports)
        .await?;

    if !conn.delete_product_report(store_id, report_id).await? {
        return Err(ErrorKind::NotFound.with_resource("report"));
    }

    tracing::info!(
        target: TRACING_TARGET,
        report_id = %report_id,
        store_id = %store_id,
        "product report dismissed"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list_store_reports, file_store_report))
        .routes(routes!(delete_store_report))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::test::{
        create_test_product, create_test_server_and_state, create_test_store, grant_starter_role,
        hire_test_employee, sign_up_account,
    };

    #[tokio::test]
    async fn staff_file_reports_and_managers_read_them() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;
        let product_id = create_test_product(&server, &owner, store_id).await?;

        let employee = sign_up_account(&server).await?;
        hire_test_employee(&server, &owner, store_id, &employee.username).await?;

        let request = FileStoreReportRequest {
            product_id,
            title: "Damaged packaging".to_string(),
            description: "Three units arrived with torn boxes.".to_string(),
            image_url: None,
        };
        let response = server
            .post(&format!("/stores/{store_id}/reports"))
            .authorization_bearer(&employee.access_token)
            .json(&request)
            .await;
        response.assert_status(StatusCode::CREATED);

        let filed: StoreReportResponse = response.json();
        assert_eq!(filed.author_id, employee.user_id);
        assert_eq!(filed.product_id, product_id);

        let response = server
            .get(&format!("/stores/{store_id}/reports"))
            .authorization_bearer(&owner.access_token)
            .await;
        response.assert_status_ok();
        let reports: Vec<StoreReportResponse> = response.json();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report_id, filed.report_id);

        Ok(())
    }

    #[tokio::test]
    async fn reports_must_target_a_listed_product() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let request = FileStoreReportRequest {
            product_id: Uuid::new_v4(),
            title: "Ghost product".to_string(),
            description: "This product does not exist.".to_string(),
            image_url: None,
        };
        let response = server
            .post(&format!("/stores/{store_id}/reports"))
            .authorization_bearer(&owner.access_token)
            .json(&request)
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn employees_file_but_do_not_read_reports() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let employee = sign_up_account(&server).await?;
        hire_test_employee(&server, &owner, store_id, &employee.username).await?;

        let response = server
            .get(&format!("/stores/{store_id}/reports"))
            .authorization_bearer(&employee.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn dismissed_reports_stay_gone() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;
        let product_id = create_test_product(&server, &owner, store_id).await?;

        let request = FileStoreReportRequest {
            product_id,
            title: "Mislabeled".to_string(),
            description: "The label lists the wrong weight.".to_string(),
            image_url: None,
        };
        let response = server
            .post(&format!("/stores/{store_id}/reports"))
            .authorization_bearer(&owner.access_token)
            .json(&request)
            .await;
        response.assert_status(StatusCode::CREATED);
        let filed: StoreReportResponse = response.json();

        let path = format!("/stores/{store_id}/reports/{}", filed.report_id);

        let response = server
            .delete(&path)
            .authorization_bearer(&owner.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server
            .delete(&path)
            .authorization_bearer(&owner.access_token)
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn strangers_cannot_file_reports() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;
        let product_id = create_test_product(&server, &owner, store_id).await?;

        let stranger = sign_up_account(&server).await?;
        let request = FileStoreReportRequest {
            product_id,
            title: "Drive-by report".to_string(),
            description: "Not even staff.".to_string(),
            image_url: None,
        };
        let response = server
            .post(&format!("/stores/{store_id}/reports"))
            .authorization_bearer(&stranger.access_token)
            .json(&request)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }
}
