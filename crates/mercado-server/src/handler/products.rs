//! Product handlers for catalog management and sales.
//!
//! Products live under their store, so every route is scoped by a store
//! authorization check first. Creation draws from the store owner's
//! `max_products` quota regardless of who lists the product. A sale is a
//! single conditional update that decrements stock and bumps the sold
//! counter together, so concurrent sales can never oversell a product.

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use mercado_postgres::model::{NewProduct, Product, UpdateProduct};
use mercado_postgres::query::{ProductRepository, QuotaOutcome, SaleOutcome};
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

/// Tracing target for product operations.
const TRACING_TARGET: &str = "mercado::handler::products";

/// Response with a single product.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ProductResponse {
    /// ID of the product.
    pub product_id: Uuid,
    /// ID of the store the product is listed in.
    pub store_id: Uuid,
    /// ID of the user who listed the product.
    pub author_id: Uuid,
    /// Name of the product.
    pub name: String,
    /// Free-form description of the product.
    pub description: String,
    /// Sale price in cents.
    pub price_cents: i64,
    /// Acquisition cost in cents.
    pub purchase_price_cents: i64,
    /// Units currently available for sale.
    pub stock: i32,
    /// Units sold so far.
    pub sold_count: i32,
    /// URL of the product image, if set.
    pub image_url: Option<String>,

    /// Timestamp when the product was created.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    /// Timestamp when the product was last updated.
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.id,
            store_id: product.store_id,
            author_id: product.author_id,
            name: product.name,
            description: product.description,
            price_cents: product.price_cents,
            purchase_price_cents: product.purchase_price_cents,
            stock: product.stock,
            sold_count: product.sold_count,
            image_url: product.image_url,
            created_at: product.created_at.into(),
            updated_at: product.updated_at.into(),
        }
    }
}

/// Returns the store's products.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/stores/{store_id}/products", tag = "products",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
        PaginationRequest,
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
            description = "The store's products, oldest listing first",
            body = Vec<ProductResponse>,
        ),
    ),
)]
async fn list_products(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
    Query(pagination): Query<PaginationRequest>,
) -> Result<(StatusCode, Json<Vec<ProductResponse>>)> {
    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ViewProducts)
        .await?;

    let products = conn
        .list_store_products(store_id, pagination.into())
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(products)))
}

/// Request payload for listing a new product.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Enameled teapot",
    "description": "Cast iron, 1.2 liters.",
    "priceCents": 4900,
    "purchasePriceCents": 2100,
    "stock": 12,
    "imageUrl": "https://img.example.com/teapot.png"
}))]
struct CreateProductRequest {
    /// Name of the product.
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    /// Free-form description of the product.
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    /// Sale price in cents.
    #[validate(range(min = 0))]
    pub price_cents: i64,
    /// Acquisition cost in cents.
    #[validate(range(min = 0))]
    pub purchase_price_cents: i64,
    /// Units initially available for sale.
    #[validate(range(min = 0))]
    pub stock: i32,
    /// URL of the product image.
    #[validate(length(min = 1, max = 2048))]
    pub image_url: Option<String>,
}

/// Lists a new product in the store.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/stores/{store_id}/products", tag = "products",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
    ),
    request_body(
        content = CreateProductRequest,
        description = "Product details",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Invalid name, prices, or stock",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "The caller may not manage products, or the owner holds no subscription role",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "The product quota is reached",
            body = ErrorResponse,
            example = json!({
                "name": "conflict",
                "message": "Product limit of 5 reached",
                "resource": "product"
            })
        ),
        (
            status = CREATED,
            description = "Product listed",
            body = ProductResponse,
        ),
    ),
)]
async fn create_product(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
    ValidateJson(request): ValidateJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        store_id = %store_id,
        name = %request.name,
        "product listing attempt"
    );

    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ManageProducts)
        .await?;

    let new_product = NewProduct {
        store_id,
        author_id: auth_state.user_id(),
        name: request.name,
        description: request.description,
        price_cents: request.price_cents,
        purchase_price_cents: request.purchase_price_cents,
        stock: request.stock,
        image_url: request.image_url,
    };

    match conn.create_product_within_quota(new_product).await? {
        QuotaOutcome::Created(product) => {
            tracing::info!(
                target: TRACING_TARGET,
                product_id = %product.id,
                store_id = %store_id,
                "product listed"
            );
            Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
        }
        QuotaOutcome::MissingRoles => {
            tracing::warn!(
                target: TRACING_TARGET,
                store_id = %store_id,
                "product listing denied: owner holds no subscription role"
            );
            Err(ErrorKind::Forbidden
                .with_message("No subscription role grants product listing")
                .with_resource("product"))
        }
        QuotaOutcome::LimitReached { limit } => {
            tracing::warn!(
                target: TRACING_TARGET,
                store_id = %store_id,
                limit = limit,
                "product listing denied: quota reached"
            );
            Err(ErrorKind::Conflict
                .with_message(format!("Product limit of {limit} reached"))
                .with_resource("product"))
        }
    }
}

/// Returns a single product.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/stores/{store_id}/products/{product_id}", tag = "products",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
        ("product_id" = Uuid, Path, description = "ID of the product"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "The caller is neither staff, owner, nor administrator",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store or product not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "The requested product",
            body = ProductResponse,
        ),
    ),
)]
async fn get_product(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path((store_id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ViewProducts)
        .await?;

    let Some(product) = conn.find_store_product(store_id, product_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("product"));
    };

    Ok((StatusCode::OK, Json(ProductResponse::from(product))))
}

/// Request payload for updating a product.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UpdateProductRequest {
    /// New name of the product.
    #[validate(length(min = 1, max = 60))]
    pub name: Option<String>,
    /// New description of the product.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// New sale price in cents.
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
    /// New acquisition cost in cents.
    #[validate(range(min = 0))]
    pub purchase_price_cents: Option<i64>,
    /// Restocked unit count.
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    /// New URL of the product image.
    #[validate(length(min = 1, max = 2048))]
    pub image_url: Option<String>,
}

impl UpdateProductRequest {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price_cents.is_none()
            && self.purchase_price_cents.is_none()
            && self.stock.is_none()
            && self.image_url.is_none()
    }
}

/// Updates a product's details or restocks it.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    put, path = "/stores/{store_id}/products/{product_id}", tag = "products",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
        ("product_id" = Uuid, Path, description = "ID of the product"),
    ),
    request_body(
        content = UpdateProductRequest,
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
            description = "The caller may not manage products",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store or product not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Product updated",
            body = ProductResponse,
        ),
    ),
)]
async fn update_product(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path((store_id, product_id)): Path<(Uuid, Uuid)>,
    ValidateJson(request): ValidateJson<UpdateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    if request.is_empty() {
        return Err(ErrorKind::BadRequest
            .with_message("No fields provided to update")
            .with_resource("product"));
    }

    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ManageProducts)
        .await?;

    let changes = UpdateProduct {
        name: request.name,
        description: request.description,
        price_cents: request.price_cents,
        purchase_price_cents: request.purchase_price_cents,
        stock: request.stock,
        image_url: request.image_url,
    };

    let Some(product) = conn.update_product(store_id, product_id, changes).await? else {
        return Err(ErrorKind::NotFound.with_resource("product"));
    };

    tracing::info!(
        target: TRACING_TARGET,
        product_id = %product.id,
        store_id = %store_id,
        "product updated"
    );

    Ok((StatusCode::OK, Json(ProductResponse::from(product))))
}

/// Removes a product from the store.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/stores/{store_id}/products/{product_id}", tag = "products",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
        ("product_id" = Uuid, Path, description = "ID of the product"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "The caller may not manage products",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store or product not found",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Product removed",
        ),
    ),
)]
async fn delete_product(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path((store_id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ManageProducts)
        .await?;

    if !conn.delete_product(store_id, product_id).await? {
        return Err(ErrorKind::NotFound.with_resource("product"));
    }

    tracing::info!(
        target: TRACING_TARGET,
        product_id = %product_id,
        store_id = %store_id,
        "product removed"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Records the sale of one unit.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/stores/{store_id}/products/{product_id}/sales", tag = "products",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
        ("product_id" = Uuid, Path, description = "ID of the product"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "The caller is neither staff, owner, nor administrator",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store or product not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Product is out of stock",
            body = ErrorResponse,
            example = json!({
                "name": "conflict",
                "message": "Product is out of stock",
                "resource": "product"
            })
        ),
        (
            status = OK,
            description = "Sale recorded; the updated product is returned",
            body = ProductResponse,
        ),
    ),
)]
async fn record_sale(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path((store_id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::RecordSales)
        .await?;

    match conn.record_sale(store_id, product_id).await? {
        SaleOutcome::Sold(product) => {
            tracing::info!(
                target: TRACING_TARGET,
                product_id = %product.id,
                store_id = %store_id,
                stock = product.stock,
                sold_count = product.sold_count,
                "sale recorded"
            );
            Ok((StatusCode::OK, Json(ProductResponse::from(product))))
        }
        SaleOutcome::OutOfStock => {
            tracing::warn!(
                target: TRACING_TARGET,
                product_id = %product_id,
                store_id = %store_id,
                "sale rejected: out of stock"
            );
            Err(ErrorKind::Conflict
                .with_message("Product is out of stock")
                .with_resource("product"))
        }
        SaleOutcome::NotFound => Err(ErrorKind::NotFound.with_resource("product")),
    }
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list_products, create_product))
        .routes(routes!(get_product, update_product, delete_product))
        .routes(routes!(record_sale))
}

#[cfg(test)]
mod test {
    use axum_test::TestServer;

    use super::*;
    use crate::handler::test::{
        TestAccount, create_test_server_and_state, create_test_store, grant_starter_role,
        hire_test_employee, hire_test_manager, sign_up_account,
    };

    async fn list_product_with_stock(
        server: &TestServer,
        account: &TestAccount,
        store_id: Uuid,
        stock: i32,
    ) -> anyhow::Result<ProductResponse> {
        let request = CreateProductRequest {
            name: format!("Widget {}", Uuid::new_v4().simple()),
            description: "A fine widget.".to_string(),
            price_cents: 4900,
            purchase_price_cents: 2100,
            stock,
            image_url: None,
        };

        let response = server
            .post(&format!("/stores/{store_id}/products"))
            .authorization_bearer(&account.access_token)
            .json(&request)
            .await;
        response.assert_status(StatusCode::CREATED);

        Ok(response.json())
    }

    #[tokio::test]
    async fn sales_move_both_counters_and_stop_at_zero() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;
        let product = list_product_with_stock(&server, &owner, store_id, 2).await?;

        let employee = sign_up_account(&server).await?;
        hire_test_employee(&server, &owner, store_id, &employee.username).await?;

        let sale_path = format!(
            "/stores/{store_id}/products/{}/sales",
            product.product_id
        );

        let response = server
            .post(&sale_path)
            .authorization_bearer(&employee.access_token)
            .await;
        response.assert_status_ok();

        let response = server
            .post(&sale_path)
            .authorization_bearer(&employee.access_token)
            .await;
        response.assert_status_ok();
        let sold_out: ProductResponse = response.json();
        assert_eq!(sold_out.stock, 0);
        assert_eq!(sold_out.sold_count, 2);

        let response = server
            .post(&sale_path)
            .authorization_bearer(&employee.access_token)
            .await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn product_listing_stops_at_the_quota() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        // The starter role admits five products per store.
        for _ in 0..5 {
            list_product_with_stock(&server, &owner, store_id, 1).await?;
        }

        let request = CreateProductRequest {
            name: "One too many".to_string(),
            description: String::new(),
            price_cents: 100,
            purchase_price_cents: 50,
            stock: 1,
            image_url: None,
        };
        let response = server
            .post(&format!("/stores/{store_id}/products"))
            .authorization_bearer(&owner.access_token)
            .json(&request)
            .await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn managers_run_the_product_catalog() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let manager = sign_up_account(&server).await?;
        hire_test_manager(&server, &owner, store_id, &manager.username).await?;

        let product = list_product_with_stock(&server, &manager, store_id, 3).await?;
        assert_eq!(product.author_id, manager.user_id);

        let path = format!("/stores/{store_id}/products/{}", product.product_id);

        let response = server
            .put(&path)
            .authorization_bearer(&manager.access_token)
            .json(&serde_json::json!({ "priceCents": 5900 }))
            .await;
        response.assert_status_ok();
        let updated: ProductResponse = response.json();
        assert_eq!(updated.price_cents, 5900);

        let response = server
            .delete(&path)
            .authorization_bearer(&manager.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server
            .get(&path)
            .authorization_bearer(&manager.access_token)
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn employees_view_but_do_not_manage() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;
        list_product_with_stock(&server, &owner, store_id, 1).await?;

        let employee = sign_up_account(&server).await?;
        hire_test_employee(&server, &owner, store_id, &employee.username).await?;

        let response = server
            .get(&format!("/stores/{store_id}/products"))
            .authorization_bearer(&employee.access_token)
            .await;
        response.assert_status_ok();
        let products: Vec<ProductResponse> = response.json();
        assert_eq!(products.len(), 1);

        let request = CreateProductRequest {
            name: "Contraband".to_string(),
            description: String::new(),
            price_cents: 100,
            purchase_price_cents: 50,
            stock: 1,
            image_url: None,
        };
        let response = server
            .post(&format!("/stores/{store_id}/products"))
            .authorization_bearer(&employee.access_token)
            .json(&request)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn empty_product_update_is_rejected() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;
        let product = list_product_with_stock(&server, &owner, store_id, 1).await?;

        let response = server
            .put(&format!("/stores/{store_id}/products/{}", product.product_id))
            .authorization_bearer(&owner.access_token)
            .json(&serde_json::json!({}))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn negative_prices_are_rejected() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let response = server
            .post(&format!("/stores/{store_id}/products"))
            .authorization_bearer(&owner.access_token)
            .json(&serde_json::json!({
                "name": "Bargain",
                "description": "",
                "priceCents": -5,
                "purchasePriceCents": 0,
                "stock": 1
            }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn strangers_cannot_browse_the_catalog() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let stranger = sign_up_account(&server).await?;
        let response = server
            .get(&format!("/stores/{store_id}/products"))
            .authorization_bearer(&stranger.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }
}
