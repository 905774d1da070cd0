//! Store handlers for creation, listing, and lifecycle management.
//!
//! Store creation is gated by the owner's `max_stores` quota: the repository
//! recounts owned stores against the owner's subscription roles inside one
//! transaction, so the handler only translates the outcome into a status
//! code. Reads and writes on a single store go through the permission table;
//! deletion stays with the owner (and administrators) and cascades the
//! store's staff, products, and reports.

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use mercado_postgres::model::{NewStore, Store, UpdateStore};
use mercado_postgres::query::{QuotaOutcome, StoreRepository};
use mercado_postgres::types::StaffPosition;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{
    AuthProvider, AuthState, Json, Path, Query, StorePermission, StoreRole, ValidateJson,
};
use crate::handler::utils::PaginationRequest;
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for store operations.
const TRACING_TARGET: &str = "mercado::handler::stores";

/// Response with a single store.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct StoreResponse {
    /// ID of the store.
    pub store_id: Uuid,
    /// ID of the user who owns the store.
    pub author_id: Uuid,
    /// Unique name of the store.
    pub name: String,
    /// URL of the store image.
    pub image_url: String,

    /// Timestamp when the store was created.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    /// Timestamp when the store was last updated.
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

impl From<Store> for StoreResponse {
    fn from(store: Store) -> Self {
        Self {
            store_id: store.id,
            author_id: store.author_id,
            name: store.name,
            image_url: store.image_url,
            created_at: store.created_at.into(),
            updated_at: store.updated_at.into(),
        }
    }
}

/// A store entry tagged with the caller's relationship to it.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct StoreListingResponse {
    /// The caller's role at the store, absent for catalog entries an
    /// administrator holds no position in.
    pub relationship: Option<StoreRole>,

    /// ID of the store.
    pub store_id: Uuid,
    /// ID of the user who owns the store.
    pub author_id: Uuid,
    /// Unique name of the store.
    pub name: String,
    /// URL of the store image.
    pub image_url: String,

    /// Timestamp when the store was created.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    /// Timestamp when the store was last updated.
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

impl StoreListingResponse {
    fn tagged(store: Store, relationship: Option<StoreRole>) -> Self {
        Self {
            relationship,
            store_id: store.id,
            author_id: store.author_id,
            name: store.name,
            image_url: store.image_url,
            created_at: store.created_at.into(),
            updated_at: store.updated_at.into(),
        }
    }
}

/// Returns the stores visible to the caller.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/stores", tag = "stores",
    params(PaginationRequest),
    responses(
        (
            status = UNAUTHORIZED,
            description = "Missing or invalid session token",
            body = ErrorResponse,
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Stores the caller owns or staffs; the whole catalog for administrators",
            body = Vec<StoreListingResponse>,
        ),
    ),
)]
async fn list_stores(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Query(pagination): Query<PaginationRequest>,
) -> Result<(StatusCode, Json<Vec<StoreListingResponse>>)> {
    let user_id = auth_state.user_id();
    tracing::trace!(
        target: TRACING_TARGET,
        user_id = %user_id,
        "store listing requested"
    );

    let mut conn = pg_client.get_connection().await?;

    let listings = if auth_state.is_admin() {
        // Administrators page through the whole catalog; ownership is still
        // tagged where it applies.
        conn.list_stores(pagination.into())
            .await?
            .into_iter()
            .map(|store| {
                let relationship = store.is_owned_by(user_id).then_some(StoreRole::Author);
                StoreListingResponse::tagged(store, relationship)
            })
            .collect()
    } else {
        let mut listings = Vec::new();
        for store in conn.list_stores_owned_by(user_id).await? {
            listings.push(StoreListingResponse::tagged(store, Some(StoreRole::Author)));
        }
        for store in conn
            .list_stores_staffed_by(user_id, StaffPosition::Manager)
            .await?
        {
            listings.push(StoreListingResponse::tagged(store, Some(StoreRole::Manager)));
        }
        for store in conn
            .list_stores_staffed_by(user_id, StaffPosition::Employee)
            .await?
        {
            listings.push(StoreListingResponse::tagged(store, Some(StoreRole::Employee)));
        }
        listings
    };

    Ok((StatusCode::OK, Json(listings)))
}

/// Request payload for creating a store.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Crab Shack",
    "imageUrl": "https://img.example.com/crab-shack.png"
}))]
struct CreateStoreRequest {
    /// Unique name of the store.
    #[validate(length(min = 3, max = 30))]
    pub name: String,
    /// URL of the store image.
    #[validate(length(min = 1, max = 2048))]
    pub image_url: String,
}

/// Creates a new store owned by the caller.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/stores", tag = "stores",
    request_body(
        content = CreateStoreRequest,
        description = "Store name and image",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Invalid name or image URL",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "The caller holds no subscription role",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Store name already taken, or the store quota is reached",
            body = ErrorResponse,
            example = json!({
                "name": "conflict",
                "message": "Store limit of 5 reached",
                "resource": "store"
            })
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Store created",
            body = StoreResponse,
        ),
    ),
)]
async fn create_store(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    ValidateJson(request): ValidateJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        user_id = %auth_state.user_id(),
        name = %request.name,
        "store creation attempt"
    );

    let mut conn = pg_client.get_connection().await?;

    let new_store = NewStore {
        author_id: auth_state.user_id(),
        name: request.name,
        image_url: request.image_url,
    };

    match conn.create_store_within_quota(new_store).await? {
        QuotaOutcome::Created(store) => {
            tracing::info!(
                target: TRACING_TARGET,
                store_id = %store.id,
                author_id = %store.author_id,
                "store created"
            );
            Ok((StatusCode::CREATED, Json(StoreResponse::from(store))))
        }
        QuotaOutcome::MissingRoles => {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %auth_state.user_id(),
                "store creation denied: no subscription role"
            );
            Err(ErrorKind::Forbidden
                .with_message("No subscription role grants store creation")
                .with_resource("store"))
        }
        QuotaOutcome::LimitReached { limit } => {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %auth_state.user_id(),
                limit = limit,
                "store creation denied: quota reached"
            );
            Err(ErrorKind::Conflict
                .with_message(format!("Store limit of {limit} reached"))
                .with_resource("store"))
        }
    }
}

/// Returns a single store.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/stores/{store_id}", tag = "stores",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "The caller is neither staff, owner, nor administrator",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "The requested store",
            body = StoreResponse,
        ),
    ),
)]
async fn get_store(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
) -> Result<(StatusCode, Json<StoreResponse>)> {
    let mut conn = pg_client.get_connection().await?;
    let (store, _access) = auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ViewStore)
        .await?;

    Ok((StatusCode::OK, Json(StoreResponse::from(store))))
}

/// Request payload for updating a store.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UpdateStoreRequest {
    /// New name of the store.
    #[validate(length(min = 3, max = 30))]
    pub name: Option<String>,
    /// New URL of the store image.
    #[validate(length(min = 1, max = 2048))]
    pub image_url: Option<String>,
}

/// Updates a store's name or image.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    put, path = "/stores/{store_id}", tag = "stores",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
    ),
    request_body(
        content = UpdateStoreRequest,
        description = "Fields to update; at least one must be present",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - No fields to update or invalid values",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "The caller may not manage this store",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Store name already taken",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Store updated",
            body = StoreResponse,
        ),
    ),
)]
async fn update_store(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
    ValidateJson(request): ValidateJson<UpdateStoreRequest>,
) -> Result<(StatusCode, Json<StoreResponse>)> {
    if request.name.is_none() && request.image_url.is_none() {
        return Err(ErrorKind::BadRequest
            .with_message("No fields provided to update")
            .with_resource("store"));
    }

    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ManageStore)
        .await?;

    let changes = UpdateStore {
        name: request.name,
        image_url: request.image_url,
    };

    // The store was just authorized, so a missing row means it was deleted
    // underneath this request.
    let Some(store) = conn.update_store(store_id, changes).await? else {
        return Err(ErrorKind::NotFound.with_resource("store"));
    };

    tracing::info!(
        target: TRACING_TARGET,
        store_id = %store.id,
        user_id = %auth_state.user_id(),
        "store updated"
    );

    Ok((StatusCode::OK, Json(StoreResponse::from(store))))
}

/// Deletes a store together with its staff, products, and reports.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/stores/{store_id}", tag = "stores",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Only the owner or an administrator may delete a store",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Store deleted",
        ),
    ),
)]
async fn delete_store(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::DeleteStore)
        .await?;

    if !conn.delete_store(store_id).await? {
        return Err(ErrorKind::NotFound.with_resource("store"));
    }

    tracing::info!(
        target: TRACING_TARGET,
        store_id = %store_id,
        user_id = %auth_state.user_id(),
        "store deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list_stores, create_store))
        .routes(routes!(get_store, update_store, delete_store))
}

#[cfg(test)]
mod test {
    use anyhow::Context as _;
    use mercado_postgres::query::{
        ProductReportRepository, ProductRepository, RoleRepository, UserRoleRepository,
    };
    use mercado_postgres::types::OffsetPagination;

    use super::*;
    use crate::handler::test::{
        create_test_product, create_test_server, create_test_server_and_state, create_test_store,
        grant_starter_role, sign_up_account, unique_store_name,
    };

    #[tokio::test]
    async fn store_creation_requires_a_subscription_role() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;

        let request = CreateStoreRequest {
            name: unique_store_name(),
            image_url: "https://img.example.com/store.png".to_string(),
        };

        let response = server
            .post("/stores")
            .authorization_bearer(&account.access_token)
            .json(&request)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn store_creation_stops_at_the_quota() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        grant_starter_role(&state, account.user_id).await?;

        // The starter role admits five stores.
        for _ in 0..5 {
            let request = CreateStoreRequest {
                name: unique_store_name(),
                image_url: "https://img.example.com/store.png".to_string(),
            };
            let response = server
                .post("/stores")
                .authorization_bearer(&account.access_token)
                .json(&request)
                .await;
            response.assert_status(StatusCode::CREATED);
        }

        let request = CreateStoreRequest {
            name: unique_store_name(),
            image_url: "https://img.example.com/store.png".to_string(),
        };
        let response = server
            .post("/stores")
            .authorization_bearer(&account.access_token)
            .json(&request)
            .await;
        response.assert_status_conflict();

        // Upgrading the subscription widens the limit on the next attempt.
        {
            let mut conn = state.postgres.get_connection().await?;
            let upgraded = conn
                .find_role_by_name("shop_level2")
                .await?
                .context("the upgraded role is not seeded")?;
            let replaced = conn
                .replace_user_roles(account.user_id, vec![upgraded.id])
                .await?;
            anyhow::ensure!(replaced.is_some(), "role upgrade was rejected");
        }

        let response = server
            .post("/stores")
            .authorization_bearer(&account.access_token)
            .json(&CreateStoreRequest {
                name: unique_store_name(),
                image_url: "https://img.example.com/store.png".to_string(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_store_names_collide() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        grant_starter_role(&state, account.user_id).await?;

        let request = CreateStoreRequest {
            name: unique_store_name(),
            image_url: "https://img.example.com/store.png".to_string(),
        };

        let response = server
            .post("/stores")
            .authorization_bearer(&account.access_token)
            .json(&request)
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .post("/stores")
            .authorization_bearer(&account.access_token)
            .json(&request)
            .await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn owner_reads_and_updates_their_store() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        grant_starter_role(&state, account.user_id).await?;
        let store_id = create_test_store(&server, &account).await?;

        let response = server
            .get(&format!("/stores/{store_id}"))
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status_ok();
        let body: StoreResponse = response.json();
        assert_eq!(body.store_id, store_id);
        assert_eq!(body.author_id, account.user_id);

        let renamed = unique_store_name();
        let response = server
            .put(&format!("/stores/{store_id}"))
            .authorization_bearer(&account.access_token)
            .json(&serde_json::json!({ "name": renamed }))
            .await;
        response.assert_status_ok();
        let body: StoreResponse = response.json();
        assert_eq!(body.name, renamed);

        Ok(())
    }

    #[tokio::test]
    async fn empty_update_payload_is_rejected() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        grant_starter_role(&state, account.user_id).await?;
        let store_id = create_test_store(&server, &account).await?;

        let response = server
            .put(&format!("/stores/{store_id}"))
            .authorization_bearer(&account.access_token)
            .json(&serde_json::json!({}))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn strangers_cannot_read_or_delete_a_store() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let stranger = sign_up_account(&server).await?;

        let response = server
            .get(&format!("/stores/{store_id}"))
            .authorization_bearer(&stranger.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .delete(&format!("/stores/{store_id}"))
            .authorization_bearer(&stranger.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn owner_deletes_their_store() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        grant_starter_role(&state, account.user_id).await?;
        let store_id = create_test_store(&server, &account).await?;

        let response = server
            .delete(&format!("/stores/{store_id}"))
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server
            .get(&format!("/stores/{store_id}"))
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn store_deletion_sweeps_products_and_reports() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        grant_starter_role(&state, account.user_id).await?;
        let store_id = create_test_store(&server, &account).await?;
        let product_id = create_test_product(&server, &account, store_id).await?;

        let response = server
            .post(&format!("/stores/{store_id}/reports"))
            .authorization_bearer(&account.access_token)
            .json(&serde_json::json!({
                "productId": product_id,
                "title": "Wrong label",
                "description": "The shelf label does not match the listing.",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .delete(&format!("/stores/{store_id}"))
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        // The schema cascades; nothing belonging to the store survives it.
        let mut conn = state.postgres.get_connection().await?;
        let product = conn.find_store_product(store_id, product_id).await?;
        assert!(product.is_none());
        let reports = conn
            .list_store_reports(store_id, OffsetPagination::new(10, 0))
            .await?;
        assert!(reports.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn listing_tags_owned_stores() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        grant_starter_role(&state, account.user_id).await?;
        create_test_store(&server, &account).await?;
        create_test_store(&server, &account).await?;

        let response = server
            .get("/stores")
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status_ok();

        let body: Vec<StoreListingResponse> = response.json();
        assert_eq!(body.len(), 2);
        assert!(
            body.iter()
                .all(|entry| entry.relationship == Some(StoreRole::Author))
        );

        Ok(())
    }

    #[tokio::test]
    async fn listing_is_empty_for_uninvolved_users() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;

        let response = server
            .get("/stores")
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status_ok();

        let body: Vec<StoreListingResponse> = response.json();
        assert!(body.is_empty());

        Ok(())
    }
}
