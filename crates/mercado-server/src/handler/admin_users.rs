//! Administrator handlers for the user registry and admin standing.
//!
//! Role assignment is wholesale: the submitted set replaces whatever the
//! user held before, and an unknown id rejects the whole request so a typo
//! cannot half-apply. Promotion and demotion of administrators are reserved
//! for the principal administrator, and the principal account itself can
//! never be demoted.

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use mercado_postgres::model::{Role, User};
use mercado_postgres::query::{UserRepository, UserRoleRepository};
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

/// Tracing target for administrative user operations.
const TRACING_TARGET: &str = "mercado::handler::admin_users";

/// Response with a single user account.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UserResponse {
    /// ID of the account.
    pub user_id: Uuid,
    /// Unique username of the account.
    pub username: String,
    /// Unique email address of the account.
    pub email_address: String,
    /// URL of the account's avatar, if set.
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

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            email_address: user.email_address,
            avatar_url: user.avatar_url,
            is_admin: user.is_admin,
            is_principal_admin: user.is_principal_admin,
            created_at: user.created_at.into(),
            updated_at: user.updated_at.into(),
        }
    }
}

/// Response with a single subscription role.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RoleSummaryResponse {
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
}

impl From<Role> for RoleSummaryResponse {
    fn from(role: Role) -> Self {
        Self {
            role_id: role.id,
            name: role.name,
            description: role.description,
            max_stores: role.max_stores,
            max_products: role.max_products,
            max_managers: role.max_managers,
            max_employees: role.max_employees,
        }
    }
}

/// Returns the registered user accounts.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/admin/users", tag = "admin",
    params(PaginationRequest),
    responses(
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Registered accounts, newest first",
            body = Vec<UserResponse>,
        ),
    ),
)]
async fn list_users(
    State(pg_client): State<PgClient>,
    _auth_state: AuthState,
    Query(pagination): Query<PaginationRequest>,
) -> Result<(StatusCode, Json<Vec<UserResponse>>)> {
    let mut conn = pg_client.get_connection().await?;

    let users = conn
        .list_users(pagination.into())
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(users)))
}

/// Returns the subscription roles held by a user.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/admin/users/{user_id}/roles", tag = "admin",
    params(
        ("user_id" = Uuid, Path, description = "ID of the user's account"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Account not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "The user's subscription roles",
            body = Vec<RoleSummaryResponse>,
        ),
    ),
)]
async fn get_user_roles(
    State(pg_client): State<PgClient>,
    _auth_state: AuthState,
    Path(user_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Vec<RoleSummaryResponse>>)> {
    let mut conn = pg_client.get_connection().await?;

    if conn.find_user_by_id(user_id).await?.is_none() {
        return Err(ErrorKind::NotFound.with_resource("account"));
    }

    let roles = conn
        .list_roles_for_user(user_id)
        .await?
        .into_iter()
        .map(RoleSummaryResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(roles)))
}

/// Request payload for replacing a user's role set.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "roleIds": ["0193b2a0-5a44-7f03-8c11-6d1e0c2b9f21"]
}))]
struct AssignRolesRequest {
    /// The complete role set the user should hold; an empty list clears it.
    #[validate(length(max = 32))]
    pub role_ids: Vec<Uuid>,
}

/// Replaces the subscription roles held by a user.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    put, path = "/admin/users/{user_id}/roles", tag = "admin",
    params(
        ("user_id" = Uuid, Path, description = "ID of the user's account"),
    ),
    request_body(
        content = AssignRolesRequest,
        description = "The complete role set to assign",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Malformed role list",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Account not found, or a role id is unknown",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "The user's new role set",
            body = Vec<RoleSummaryResponse>,
        ),
    ),
)]
async fn assign_user_roles(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(user_id): Path<Uuid>,
    ValidateJson(request): ValidateJson<AssignRolesRequest>,
) -> Result<(StatusCode, Json<Vec<RoleSummaryResponse>>)> {
    let mut conn = pg_client.get_connection().await?;

    if conn.find_user_by_id(user_id).await?.is_none() {
        return Err(ErrorKind::NotFound.with_resource("account"));
    }

    // Unknown ids reject the whole set; the previous assignment stays.
    let Some(roles) = conn.replace_user_roles(user_id, request.role_ids).await? else {
        return Err(ErrorKind::NotFound
            .with_message("One or more role ids are unknown")
            .with_resource("role"));
    };

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user_id,
        admin_id = %auth_state.user_id(),
        roles = roles.len(),
        "user roles replaced"
    );

    let roles = roles.into_iter().map(RoleSummaryResponse::from).collect();

    Ok((StatusCode::OK, Json(roles)))
}

/// Returns the administrator accounts.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/admin/admins", tag = "admin",
    responses(
        (
            status = FORBIDDEN,
            description = "Administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Administrator accounts, oldest first",
            body = Vec<UserResponse>,
        ),
    ),
)]
async fn list_admins(
    State(pg_client): State<PgClient>,
    _auth_state: AuthState,
) -> Result<(StatusCode, Json<Vec<UserResponse>>)> {
    let mut conn = pg_client.get_connection().await?;

    let admins = conn
        .list_admins()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(admins)))
}

/// Request payload for promoting a user to administrator.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "handle": "ferris23"
}))]
struct PromoteAdminRequest {
    /// Username or email address of the account to promote.
    #[validate(length(min = 3, max = 320))]
    pub handle: String,
}

/// Grants administrator standing to a user.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    put, path = "/admin/admins", tag = "admin",
    request_body(
        content = PromoteAdminRequest,
        description = "Handle of the account to promote",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Invalid handle",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "Principal administrator privileges required",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "No account matches that handle",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "This user is already an administrator",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Administrator standing granted",
            body = UserResponse,
        ),
    ),
)]
async fn promote_admin(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    ValidateJson(request): ValidateJson<PromoteAdminRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    auth_state.authorize_principal()?;

    let mut conn = pg_client.get_connection().await?;

    let Some(candidate) = conn.find_user_by_handle(&request.handle).await? else {
        return Err(ErrorKind::NotFound
            .with_message("No account matches that handle")
            .with_resource("account"));
    };

    let Some(admin) = conn.promote_to_admin(candidate.id).await? else {
        return Err(ErrorKind::Conflict
            .with_message("This user is already an administrator")
            .with_resource("account"));
    };

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %admin.id,
        principal_id = %auth_state.user_id(),
        "administrator standing granted"
    );

    Ok((StatusCode::OK, Json(UserResponse::from(admin))))
}

/// Revokes a user's administrator standing.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/admin/admins/{user_id}", tag = "admin",
    params(
        ("user_id" = Uuid, Path, description = "ID of the administrator's account"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Principal privileges required, or the target is the principal",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Account not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "This user is not an administrator",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Administrator standing revoked",
        ),
    ),
)]
async fn demote_admin(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode> {
    auth_state.authorize_principal()?;

    let mut conn = pg_client.get_connection().await?;

    if conn.demote_from_admin(user_id).await?.is_none() {
        // The demotion filter skipped the row; find out why.
        let Some(user) = conn.find_user_by_id(user_id).await? else {
            return Err(ErrorKind::NotFound.with_resource("account"));
        };
        if user.is_principal_admin() {
            return Err(ErrorKind::Forbidden
                .with_message("The principal administrator cannot be demoted")
                .with_resource("account"));
        }
        return Err(ErrorKind::Conflict
            .with_message("This user is not an administrator")
            .with_resource("account"));
    }

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user_id,
        principal_id = %auth_state.user_id(),
        "administrator standing revoked"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list_users))
        .routes(routes!(get_user_roles, assign_user_roles))
        .routes(routes!(list_admins, promote_admin))
        .routes(routes!(demote_admin))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::test::{
        create_test_server, create_test_server_and_state, sign_in_root_admin, sign_up_account,
        starter_role_id,
    };

    #[tokio::test]
    async fn admins_page_through_the_registry() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;
        let admin = sign_in_root_admin(&server).await?;

        let response = server
            .get("/admin/users")
            .add_query_param("limit", 50)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_ok();

        let users: Vec<UserResponse> = response.json();
        assert!(users.iter().any(|entry| entry.user_id == account.user_id));

        Ok(())
    }

    #[tokio::test]
    async fn the_registry_is_admin_territory() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;

        let response = server
            .get("/admin/users")
            .authorization_bearer(&account.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn role_assignment_is_wholesale() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        let admin = sign_in_root_admin(&server).await?;
        let level1 = starter_role_id(&state).await?;

        let path = format!("/admin/users/{}/roles", account.user_id);

        let response = server
            .put(&path)
            .authorization_bearer(&admin.access_token)
            .json(&AssignRolesRequest {
                role_ids: vec![level1],
            })
            .await;
        response.assert_status_ok();
        let roles: Vec<RoleSummaryResponse> = response.json();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "shop_level1");

        // An empty set clears the assignment.
        let response = server
            .put(&path)
            .authorization_bearer(&admin.access_token)
            .json(&AssignRolesRequest { role_ids: vec![] })
            .await;
        response.assert_status_ok();
        let roles: Vec<RoleSummaryResponse> = response.json();
        assert!(roles.is_empty());

        let response = server
            .get(&path)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_ok();
        let roles: Vec<RoleSummaryResponse> = response.json();
        assert!(roles.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn unknown_role_ids_reject_the_whole_set() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let account = sign_up_account(&server).await?;
        let admin = sign_in_root_admin(&server).await?;
        let level1 = starter_role_id(&state).await?;

        let path = format!("/admin/users/{}/roles", account.user_id);

        let response = server
            .put(&path)
            .authorization_bearer(&admin.access_token)
            .json(&AssignRolesRequest {
                role_ids: vec![level1],
            })
            .await;
        response.assert_status_ok();

        let response = server
            .put(&path)
            .authorization_bearer(&admin.access_token)
            .json(&AssignRolesRequest {
                role_ids: vec![level1, Uuid::new_v4()],
            })
            .await;
        response.assert_status_not_found();

        // The failed replacement left the previous set in place.
        let response = server
            .get(&path)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_ok();
        let roles: Vec<RoleSummaryResponse> = response.json();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role_id, level1);

        Ok(())
    }

    #[tokio::test]
    async fn missing_accounts_yield_not_found() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let admin = sign_in_root_admin(&server).await?;

        let path = format!("/admin/users/{}/roles", Uuid::new_v4());

        let response = server
            .get(&path)
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_not_found();

        let response = server
            .put(&path)
            .authorization_bearer(&admin.access_token)
            .json(&AssignRolesRequest { role_ids: vec![] })
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn principal_promotes_and_demotes() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let account = sign_up_account(&server).await?;
        let admin = sign_in_root_admin(&server).await?;

        let response = server
            .put("/admin/admins")
            .authorization_bearer(&admin.access_token)
            .json(&PromoteAdminRequest {
                handle: account.username.clone(),
            })
            .await;
        response.assert_status_ok();
        let promoted: UserResponse = response.json();
        assert!(promoted.is_admin);
        assert!(!promoted.is_principal_admin);

        // Promoting an administrator again conflicts.
        let response = server
            .put("/admin/admins")
            .authorization_bearer(&admin.access_token)
            .json(&PromoteAdminRequest {
                handle: account.username.clone(),
            })
            .await;
        response.assert_status_conflict();

        let response = server
            .delete(&format!("/admin/admins/{}", account.user_id))
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        // Once demoted, another demotion has nothing to revoke.
        let response = server
            .delete(&format!("/admin/admins/{}", account.user_id))
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn demotion_takes_effect_on_the_next_request() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let deputy = sign_up_account(&server).await?;
        let admin = sign_in_root_admin(&server).await?;

        let response = server
            .put("/admin/admins")
            .authorization_bearer(&admin.access_token)
            .json(&PromoteAdminRequest {
                handle: deputy.username.clone(),
            })
            .await;
        response.assert_status_ok();

        // Tokens carry identity only; the signup-era token picks up the
        // promotion without being reissued.
        let response = server
            .get("/admin/users")
            .authorization_bearer(&deputy.access_token)
            .await;
        response.assert_status_ok();

        let response = server
            .delete(&format!("/admin/admins/{}", deputy.user_id))
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        // And it loses the standing just as fast.
        let response = server
            .get("/admin/users")
            .authorization_bearer(&deputy.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn the_principal_cannot_be_demoted() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let admin = sign_in_root_admin(&server).await?;

        let response = server
            .delete(&format!("/admin/admins/{}", admin.user_id))
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn regular_admins_cannot_shape_the_admin_roster() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let deputy = sign_up_account(&server).await?;
        let target = sign_up_account(&server).await?;
        let admin = sign_in_root_admin(&server).await?;

        let response = server
            .put("/admin/admins")
            .authorization_bearer(&admin.access_token)
            .json(&PromoteAdminRequest {
                handle: deputy.username.clone(),
            })
            .await;
        response.assert_status_ok();

        // Standing is read from the database per request, so the deputy's
        // original token now carries admin access everywhere but here.
        let response = server
            .put("/admin/admins")
            .authorization_bearer(&deputy.access_token)
            .json(&PromoteAdminRequest {
                handle: target.username.clone(),
            })
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .delete(&format!("/admin/admins/{}", deputy.user_id))
            .authorization_bearer(&admin.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        Ok(())
    }
}
