//! Administrator handlers for the subscription role registry.
//!
//! Roles bundle the four creation limits that drive quota checks. Editing a
//! role changes what every holder may create from the next request on;
//! deleting one drops it from every holder's set through the assignment
//! table's cascade.

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use mercado_postgres::model::{NewRole, Role, UpdateRole};
use mercado_postgres::query::RoleRepository;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthProvider, AuthState, Json, Path, Query, ValidateJson};
use crate::handler::utils::PaginationRequest;
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for role registry operations.
const TRACING_TARGET: &str = "mercado::handler::admin_roles";

/// Response with a single subscription role.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RoleResponse {
    /// ID of the role.
    pub role_id: Uuid,
    /// Unique name of the role.
    pub name: String,
    /// Free-form description of what the role is for.
    pub description: String,
    /// Maximum number of stores a holder may own.
    pub max_stores: i32,
    /// Maximum number of products per store the holder owns.
    pub max_products: i32,
    /// Maximum number of managers per store the holder owns.
    pub max_managers: i32,
    /// Maximum number of employees per store the holder owns.
    pub max_employees: i32,

    /// Timestamp when the role was created.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    /// Timestamp when the role was last updated.
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            role_id: role.id,
            name: role.name,
            description: role.description,
            max_stores: role.max_stores,
            max_products: role.max_products,
            max_managers: role.max_managers,
            max_employees: role.max_employees,
            created_at: role.created_at.into(),
            updated_at: role.updated_at.into(),
        }
    }
}

/// Returns the subscription roles.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/admin/roles", tag = "admin",
    params(PaginationRequest),
    responses(
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Subscription roles, ordered by name",
            body = Vec<RoleResponse>,
        ),
    ),
)]
async fn list_roles(
    State(pg_client): State<PgClient>,
    _auth_state: AuthState,
    Query(pagination): Query<PaginationRequest>,
) -> Result<(StatusCode, Json<Vec<RoleResponse>>)> {
    let mut conn = pg_client.get_connection().await?;

    let roles = conn
        .list_roles(pagination.into())
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(roles)))
}

/// Request payload for creating a role.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "shop_level3",
    "description": "Top subscription tier",
    "maxStores": 20,
    "maxProducts": 20,
    "maxManagers": 20,
    "maxEmployees": 20
}))]
struct CreateRoleRequest {
    /// Unique name of the role.
    #[validate(length(min = 2, max = 64))]
    pub name: String,
    /// Free-form description of what the role is for.
    #[validate(length(max = 512))]
    #[serde(default)]
    pub description: String,
    /// Maximum number of stores a holder may own.
    #[validate(range(min = 0))]
    pub max_stores: i32,
    /// Maximum number of products per store the holder owns.
    #[validate(range(min = 0))]
    pub max_products: i32,
    /// Maximum number of managers per store the holder owns.
    #[validate(range(min = 0))]
    pub max_managers: i32,
    /// Maximum number of employees per store the holder owns.
    #[validate(range(min = 0))]
    pub max_employees: i32,
}

/// Creates a new subscription role.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/admin/roles", tag = "admin",
    request_body(
        content = CreateRoleRequest,
        description = "Role name, description, and limits",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Invalid name or negative limits",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Role name already taken",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Role created",
            body = RoleResponse,
        ),
    ),
)]
async fn create_role(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    ValidateJson(request): ValidateJson<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let new_role = NewRole {
        name: request.name,
        description: request.description,
        max_stores: request.max_stores,
        max_products: request.max_products,
        max_managers: request.max_managers,
        max_employees: request.max_employees,
    };

    let role = conn.create_role(new_role).await?;

    tracing::info!(
        target: TRACING_TARGET,
        role_id = %role.id,
        name = %role.name,
        admin_id = %auth_state.user_id(),
        "role created"
    );

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

/// Request payload replacing a role's definition.
///
/// Role updates carry the complete bundle; there is no partial patch.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "shop_level3",
    "description": "Top subscription tier",
    "maxStores": 25,
    "maxProducts": 25,
    "maxManagers": 25,
    "maxEmployees": 25
}))]
struct UpdateRoleRequest {
    /// New name of the role.
    #[validate(length(min = 2, max = 64))]
    pub name: String,
    /// New description of the role.
    #[validate(length(max = 512))]
    #[serde(default)]
    pub description: String,
    /// New maximum number of stores a holder may own.
    #[validate(range(min = 0))]
    pub max_stores: i32,
    /// New maximum number of products per store the holder owns.
    #[validate(range(min = 0))]
    pub max_products: i32,
    /// New maximum number of managers per store the holder owns.
    #[validate(range(min = 0))]
    pub max_managers: i32,
    /// New maximum number of employees per store the holder owns.
    #[validate(range(min = 0))]
    pub max_employees: i32,
}

/// Replaces a subscription role's definition.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    put, path = "/admin/roles/{role_id}", tag = "admin",
    params(
        ("role_id" = Uuid, Path, description = "ID of the role"),
    ),
    request_body(
        content = UpdateRoleRequest,
        description = "The complete replacement definition of the role",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Incomplete bundle or invalid values",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Role not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Role name already taken",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Role updated; new limits apply from the next quota check",
            body = RoleResponse,
        ),
    ),
)]
async fn update_role(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(role_id): Path<Uuid>,
    ValidateJson(request): ValidateJson<UpdateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let changes = UpdateRole {
        name: request.name,
        description: request.description,
        max_stores: request.max_stores,
        max_products: request.max_products,
        max_managers: request.max_managers,
        max_employees: request.max_employees,
    };

    let Some(role) = conn.update_role(role_id, changes).await? else {
        return Err(ErrorKind::NotFound.with_resource("role"));
    };

    tracing::info!(
        target: TRACING_TARGET,
        role_id = %role.id,
        admin_id = %auth_state.user_id(),
        "role updated"
    );

    Ok((StatusCode::OK, Json(RoleResponse::from(role))))
}

/// Deletes a subscription role.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/admin/roles/{role_id}", tag = "admin",
    params(
        ("role_id" = Uuid, Path, description = "ID of the role"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Role not found",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Role deleted and removed from every holder",
        ),
    ),
)]
async fn delete_role(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(role_id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;

    if !conn.delete_role(role_id).await? {
        return Err(ErrorKind::NotFound.with_resource("role"));
    }

    tracing::info!(
        target: TRACING_TARGET,
        role_id = %role_id,
        admin_id = %auth_state.user_id(),
        "role deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list_roles, create_role))
        .routes(routes!(update_role, delete_role))
}

#[cfg(test)]
mod test {
    use axum_test::TestServer;

    use super::*;
    use crate::handler::test::{create_test_server, sign_in_root_admin, sign_up_account};

    fn unique_role_name() -> String {
        format!("tier_{}", &Uuid::new_v4().simple().to_string()[..12])
    }

    async fn create_role_named(
        server: &TestServer,
        token: &str,
        name: &str,
    ) -> axum_test::TestResponse {
        server
            .post("/admin/roles")
            .authorization_bearer(token)
            .json(&CreateRoleRequest {
                name: name.to_string(),
                description: String::new(),
                max_stores: 3,
                max_products: 3,
                max_managers: 3,
                max_employees: 3,
            })
            .await
    }

    #[tokio::test]
    async fn admins_curate_the_role_registry() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let admin = sign_in_root_admin(&server).await?;

        let response = create_role_named(&server, &admin.access_token, &unique_role_name()).await;
        response.assert_status(StatusCode::CREATED);
        let role: RoleResponse = response.json();

        let path = format!("/admin/roles/{}", role.role_id);

        let response = server
            .put(&path)
            .authorization_bearer(&admin.access_token)
            .json(&UpdateRoleRequest {
                name: role.name.clone(),
                description: "Mid tier".to_owned(),
                max_stores: 7,
                max_products: 7,
                max_managers: 3,
                max_employees: 3,
            })
            .await;
        response.assert_status_ok();
        let updated: RoleResponse = response.json();
        assert_eq!(updated.max_stores, 7);
        assert_eq!(updated.max_products, 7);
        assert_eq!(updated.max_managers, 3);

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

    #[tokio::test]
    async fn duplicate_role_names_collide() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let admin = sign_in_root_admin(&server).await?;
        let name = unique_role_name();

        let response = create_role_named(&server, &admin.access_token, &name).await;
        response.assert_status(StatusCode::CREATED);

        let response = create_role_named(&server, &admin.access_token, &name).await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn partial_role_update_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let admin = sign_in_root_admin(&server).await?;

        let response = create_role_named(&server, &admin.access_token, &unique_role_name()).await;
        response.assert_status(StatusCode::CREATED);
        let role: RoleResponse = response.json();

        // Updates replace the whole bundle; a lone field is not a patch.
        let response = server
            .put(&format!("/admin/roles/{}", role.role_id))
            .authorization_bearer(&admin.access_token)
            .json(&serde_json::json!({ "maxStores": 7 }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn negative_limits_are_rejected() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let admin = sign_in_root_admin(&server).await?;

        let response = server
            .post("/admin/roles")
            .authorization_bearer(&admin.access_token)
            .json(&serde_json::json!({
                "name": unique_role_name(),
                "maxStores": -1,
                "maxProducts": 1,
                "maxManagers": 1,
                "maxEmployees": 1
            }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn the_default_tiers_are_seeded() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let admin = sign_in_root_admin(&server).await?;

        let response = server
            .get("/admin/roles")
            .add_query_param("limit", 50)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_ok();

        let roles: Vec<RoleResponse> = response.json();
        let names: Vec<&str> = roles.iter().map(|role| role.name.as_str()).collect();
        assert!(names.contains(&"shop_level1"));
        assert!(names.contains(&"shop_level2"));

        Ok(())
    }

    #[tokio::test]
    async fn the_registry_is_admin_territory() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;

        let response = server
            .get("/admin/roles")
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = create_role_named(&server, &account.access_token, &unique_role_name()).await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }
}
