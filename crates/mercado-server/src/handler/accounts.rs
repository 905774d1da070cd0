//! Account handlers for the authenticated caller's own profile.
//!
//! Everything here is scoped to the session owner: the profile comes straight
//! from the authenticated account row, and the role listing shows the
//! subscription roles that feed the caller's creation quotas. Accounts of
//! other users are reachable only through the admin API.

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use mercado_postgres::query::UserRoleRepository;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::extract::{AuthProvider, AuthState, Json};
use crate::handler::{ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for account operations.
const TRACING_TARGET: &str = "mercado::handler::accounts";

/// Response with the caller's own profile.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    /// ID of the account.
    pub user_id: Uuid,
    /// Login handle of the account.
    pub username: String,
    /// Email address of the account.
    pub email_address: String,
    /// URL of the profile avatar, if one is set.
    pub avatar_url: Option<String>,

    /// Whether the account holds administrator standing.
    pub is_admin: bool,
    /// Whether the account is the principal administrator.
    pub is_principal_admin: bool,

    /// Timestamp when the account was created.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    /// Timestamp when the account was last updated.
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

/// Returns the caller's own profile.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/account", tag = "accounts",
    responses(
        (
            status = UNAUTHORIZED,
            description = "Missing or invalid session token",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Profile of the authenticated account",
            body = AccountResponse,
            example = json!({
                "userId": "550e8400-e29b-41d4-a716-446655440000",
                "username": "ferris23",
                "emailAddress": "ferris@example.com",
                "avatarUrl": null,
                "isAdmin": false,
                "isPrincipalAdmin": false,
                "createdAt": "2025-01-15T10:30:00Z",
                "updatedAt": "2025-01-15T10:30:00Z"
            })
        ),
    ),
)]
async fn get_account(AuthState(user): AuthState) -> Result<(StatusCode, Json<AccountResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        user_id = %user.id,
        "profile requested"
    );

    let response = AccountResponse {
        user_id: user.id,
        username: user.username,
        email_address: user.email_address,
        avatar_url: user.avatar_url,
        is_admin: user.is_admin,
        is_principal_admin: user.is_principal_admin,
        created_at: user.created_at.into(),
        updated_at: user.updated_at.into(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// A subscription role held by the caller.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct AccountRoleResponse {
    /// ID of the role.
    pub role_id: Uuid,
    /// Name of the role.
    pub name: String,
    /// Human-readable description of the role.
    pub description: String,

    /// Maximum number of stores the role admits.
    pub max_stores: i32,
    /// Maximum number of products per store the role admits.
    pub max_products: i32,
    /// Maximum number of managers per store the role admits.
    pub max_managers: i32,
    /// Maximum number of employees per store the role admits.
    pub max_employees: i32,
}

/// Returns the subscription roles held by the caller.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/account/roles", tag = "accounts",
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
            description = "Roles held by the authenticated account",
            body = Vec<AccountRoleResponse>,
        ),
    ),
)]
async fn get_account_roles(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
) -> Result<(StatusCode, Json<Vec<AccountRoleResponse>>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        user_id = %auth_state.user_id(),
        "role listing requested"
    );

    let mut conn = pg_client.get_connection().await?;
    let roles = conn.list_roles_for_user(auth_state.user_id()).await?;

    let response = roles
        .into_iter()
        .map(|role| AccountRoleResponse {
            role_id: role.id,
            name: role.name,
            description: role.description,
            max_stores: role.max_stores,
            max_products: role.max_products,
            max_managers: role.max_managers,
            max_employees: role.max_employees,
        })
        .collect();

    Ok((StatusCode::OK, Json(response)))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(get_account))
        .routes(routes!(get_account_roles))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::test::{
        create_test_server, create_test_server_and_state, grant_starter_role, sign_up_account,
    };

    #[tokio::test]
    async fn profile_reflects_the_session_owner() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;

        let response = server
            .get("/account")
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status_ok();

        let body: AccountResponse = response.json();
        assert_eq!(body.user_id, account.user_id);
        assert_eq!(body.username, account.username);
        assert!(!body.is_admin);
        assert!(!body.is_principal_admin);

        Ok(())
    }

    #[tokio::test]
    async fn profile_requires_authentication() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/account").await;
        response.assert_status_unauthorized();

        Ok(())
    }

    #[tokio::test]
    async fn fresh_accounts_hold_no_roles() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;

        let response = server
            .get("/account/roles")
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status_ok();

        let body: Vec<AccountRoleResponse> = response.json();
        assert!(body.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn granted_roles_show_up_in_the_listing() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        grant_starter_role(&state, account.user_id).await?;

        let response = server
            .get("/account/roles")
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status_ok();

        let body: Vec<AccountRoleResponse> = response.json();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].name, "shop_level1");
        assert!(body[0].max_stores > 0);

        Ok(())
    }
}
