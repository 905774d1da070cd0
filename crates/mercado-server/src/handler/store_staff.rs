//! Staff roster handlers for hiring, listing, and dismissing store staff.
//!
//! Managers and employees share one membership table, so a user holds at
//! most one position per store. Hiring is gated by the store owner's quota
//! for the position being filled, not the caller's: a manager hiring an
//! employee still draws from the owner's `max_employees` allowance. Manager
//! changes stay with the owner; managers may shape the employee roster.

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use mercado_postgres::model::{NewStoreStaff, StoreStaff, User};
use mercado_postgres::query::{QuotaOutcome, StoreStaffRepository, UserRepository};
use mercado_postgres::types::StaffPosition;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthProvider, AuthState, Json, Path, StorePermission, ValidateJson};
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for staff operations.
const TRACING_TARGET: &str = "mercado::handler::store_staff";

/// Returns the permission that guards roster changes for a position.
const fn manage_permission(position: StaffPosition) -> StorePermission {
    match position {
        StaffPosition::Manager => StorePermission::ManageManagers,
        StaffPosition::Employee => StorePermission::ManageEmployees,
    }
}

/// Response with a single staff member.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct StaffResponse {
    /// ID of the store the member works at.
    pub store_id: Uuid,
    /// ID of the member's user account.
    pub user_id: Uuid,
    /// Username of the member.
    pub username: String,
    /// URL of the member's avatar, if set.
    pub avatar_url: Option<String>,
    /// The member's position at the store.
    pub position: StaffPosition,

    /// Timestamp when the member joined the staff.
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
}

impl StaffResponse {
    fn from_parts(staff: StoreStaff, user: User) -> Self {
        Self {
            store_id: staff.store_id,
            user_id: staff.user_id,
            username: user.username,
            avatar_url: user.avatar_url,
            position: staff.position,
            created_at: staff.created_at.into(),
        }
    }
}

/// Request payload for hiring a staff member.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "handle": "ferris23"
}))]
struct HireStaffRequest {
    /// Username or email address of the account to hire.
    #[validate(length(min = 3, max = 320))]
    pub handle: String,
}

async fn list_staff(
    pg_client: PgClient,
    auth_state: AuthState,
    store_id: Uuid,
    position: StaffPosition,
) -> Result<(StatusCode, Json<Vec<StaffResponse>>)> {
    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, StorePermission::ViewStaff)
        .await?;

    let roster = conn
        .list_staff_with_users(store_id, position)
        .await?
        .into_iter()
        .map(|(staff, user)| StaffResponse::from_parts(staff, user))
        .collect();

    Ok((StatusCode::OK, Json(roster)))
}

async fn hire_staff(
    pg_client: PgClient,
    auth_state: AuthState,
    store_id: Uuid,
    request: HireStaffRequest,
    position: StaffPosition,
) -> Result<(StatusCode, Json<StaffResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        store_id = %store_id,
        position = %position,
        "hiring attempt"
    );

    let mut conn = pg_client.get_connection().await?;
    let (store, _access) = auth_state
        .authorize_store(&mut conn, store_id, manage_permission(position))
        .await?;

    let Some(candidate) = conn.find_user_by_handle(&request.handle).await? else {
        return Err(ErrorKind::NotFound
            .with_message("No account matches that handle")
            .with_resource("account"));
    };

    // The owner already outranks every staff position.
    if store.is_owned_by(candidate.id) {
        return Err(ErrorKind::Conflict
            .with_message("The store owner cannot join the staff")
            .with_resource("staff"));
    }

    let new_staff = NewStoreStaff {
        store_id,
        user_id: candidate.id,
        position,
    };

    match conn.add_staff_within_quota(new_staff).await? {
        QuotaOutcome::Created(staff) => {
            tracing::info!(
                target: TRACING_TARGET,
                store_id = %store_id,
                user_id = %staff.user_id,
                position = %position,
                "staff hired"
            );
            Ok((
                StatusCode::CREATED,
                Json(StaffResponse::from_parts(staff, candidate)),
            ))
        }
        QuotaOutcome::MissingRoles => {
            tracing::warn!(
                target: TRACING_TARGET,
                store_id = %store_id,
                "hiring denied: owner holds no subscription role"
            );
            Err(ErrorKind::Forbidden
                .with_message("No subscription role grants hiring staff")
                .with_resource("staff"))
        }
        QuotaOutcome::LimitReached { limit } => {
            tracing::warn!(
                target: TRACING_TARGET,
                store_id = %store_id,
                position = %position,
                limit = limit,
                "hiring denied: quota reached"
            );
            Err(ErrorKind::Conflict
                .with_message(format!("{position} limit of {limit} reached"))
                .with_resource("staff"))
        }
    }
}

async fn dismiss_staff(
    pg_client: PgClient,
    auth_state: AuthState,
    store_id: Uuid,
    user_id: Uuid,
    position: StaffPosition,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;
    auth_state
        .authorize_store(&mut conn, store_id, manage_permission(position))
        .await?;

    if !conn.remove_staff(store_id, user_id, position).await? {
        return Err(ErrorKind::NotFound
            .with_message("This user does not hold that position here")
            .with_resource("staff"));
    }

    tracing::info!(
        target: TRACING_TARGET,
        store_id = %store_id,
        user_id = %user_id,
        position = %position,
        "staff dismissed"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the store's managers.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/stores/{store_id}/managers", tag = "staff",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Only the owner, managers, and administrators see the roster",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "The store's managers, oldest hire first",
            body = Vec<StaffResponse>,
        ),
    ),
)]
async fn list_managers(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Vec<StaffResponse>>)> {
    list_staff(pg_client, auth_state, store_id, StaffPosition::Manager).await
}

/// Hires a manager for the store.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    put, path = "/stores/{store_id}/managers", tag = "staff",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
    ),
    request_body(
        content = HireStaffRequest,
        description = "Handle of the account to hire",
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
            description = "Only the owner hires managers, and only within a subscription role",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store or account not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Already on the staff, or the manager quota is reached",
            body = ErrorResponse,
            example = json!({
                "name": "conflict",
                "message": "Manager limit of 5 reached",
                "resource": "staff"
            })
        ),
        (
            status = CREATED,
            description = "Manager hired",
            body = StaffResponse,
        ),
    ),
)]
async fn hire_manager(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
    ValidateJson(request): ValidateJson<HireStaffRequest>,
) -> Result<(StatusCode, Json<StaffResponse>)> {
    hire_staff(pg_client, auth_state, store_id, request, StaffPosition::Manager).await
}

/// Dismisses a manager from the store.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/stores/{store_id}/managers/{user_id}", tag = "staff",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
        ("user_id" = Uuid, Path, description = "ID of the manager's account"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Only the owner dismisses managers",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found, or the user is not a manager here",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Manager dismissed",
        ),
    ),
)]
async fn dismiss_manager(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path((store_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    dismiss_staff(pg_client, auth_state, store_id, user_id, StaffPosition::Manager).await
}

/// Returns the store's employees.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/stores/{store_id}/employees", tag = "staff",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "Only the owner, managers, and administrators see the roster",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "The store's employees, oldest hire first",
            body = Vec<StaffResponse>,
        ),
    ),
)]
async fn list_employees(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Vec<StaffResponse>>)> {
    list_staff(pg_client, auth_state, store_id, StaffPosition::Employee).await
}

/// Hires an employee for the store.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    put, path = "/stores/{store_id}/employees", tag = "staff",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
    ),
    request_body(
        content = HireStaffRequest,
        description = "Handle of the account to hire",
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
            description = "The caller may not shape the employee roster",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store or account not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Already on the staff, or the employee quota is reached",
            body = ErrorResponse,
            example = json!({
                "name": "conflict",
                "message": "Employee limit of 5 reached",
                "resource": "staff"
            })
        ),
        (
            status = CREATED,
            description = "Employee hired",
            body = StaffResponse,
        ),
    ),
)]
async fn hire_employee(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path(store_id): Path<Uuid>,
    ValidateJson(request): ValidateJson<HireStaffRequest>,
) -> Result<(StatusCode, Json<StaffResponse>)> {
    hire_staff(pg_client, auth_state, store_id, request, StaffPosition::Employee).await
}

/// Dismisses an employee from the store.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/stores/{store_id}/employees/{user_id}", tag = "staff",
    params(
        ("store_id" = Uuid, Path, description = "ID of the store"),
        ("user_id" = Uuid, Path, description = "ID of the employee's account"),
    ),
    responses(
        (
            status = FORBIDDEN,
            description = "The caller may not shape the employee roster",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Store not found, or the user is not an employee here",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Employee dismissed",
        ),
    ),
)]
async fn dismiss_employee(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
    Path((store_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    dismiss_staff(pg_client, auth_state, store_id, user_id, StaffPosition::Employee).await
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list_managers, hire_manager))
        .routes(routes!(dismiss_manager))
        .routes(routes!(list_employees, hire_employee))
        .routes(routes!(dismiss_employee))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::test::{
        create_test_server_and_state, create_test_store, grant_starter_role, sign_up_account,
    };

    #[tokio::test]
    async fn owner_hires_and_lists_managers() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let hire = sign_up_account(&server).await?;
        let response = server
            .put(&format!("/stores/{store_id}/managers"))
            .authorization_bearer(&owner.access_token)
            .json(&HireStaffRequest {
                handle: hire.username.clone(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/stores/{store_id}/managers"))
            .authorization_bearer(&owner.access_token)
            .await;
        response.assert_status_ok();

        let roster: Vec<StaffResponse> = response.json();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].user_id, hire.user_id);
        assert_eq!(roster[0].username, hire.username);
        assert_eq!(roster[0].position, StaffPosition::Manager);

        Ok(())
    }

    #[tokio::test]
    async fn hiring_stops_at_the_manager_quota() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        // The starter role admits five managers per store.
        for _ in 0..5 {
            let hire = sign_up_account(&server).await?;
            let response = server
                .put(&format!("/stores/{store_id}/managers"))
                .authorization_bearer(&owner.access_token)
                .json(&HireStaffRequest {
                    handle: hire.username,
                })
                .await;
            response.assert_status(StatusCode::CREATED);
        }

        let hire = sign_up_account(&server).await?;
        let response = server
            .put(&format!("/stores/{store_id}/managers"))
            .authorization_bearer(&owner.access_token)
            .json(&HireStaffRequest {
                handle: hire.username,
            })
            .await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn owner_cannot_join_their_own_staff() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let response = server
            .put(&format!("/stores/{store_id}/employees"))
            .authorization_bearer(&owner.access_token)
            .json(&HireStaffRequest {
                handle: owner.username.clone(),
            })
            .await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn one_position_per_store_member() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let hire = sign_up_account(&server).await?;
        let response = server
            .put(&format!("/stores/{store_id}/managers"))
            .authorization_bearer(&owner.access_token)
            .json(&HireStaffRequest {
                handle: hire.username.clone(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        // Same membership key backs both rosters.
        let response = server
            .put(&format!("/stores/{store_id}/employees"))
            .authorization_bearer(&owner.access_token)
            .json(&HireStaffRequest {
                handle: hire.username.clone(),
            })
            .await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn managers_hire_employees_but_not_managers() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let manager = sign_up_account(&server).await?;
        let response = server
            .put(&format!("/stores/{store_id}/managers"))
            .authorization_bearer(&owner.access_token)
            .json(&HireStaffRequest {
                handle: manager.username.clone(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let recruit = sign_up_account(&server).await?;
        let response = server
            .put(&format!("/stores/{store_id}/employees"))
            .authorization_bearer(&manager.access_token)
            .json(&HireStaffRequest {
                handle: recruit.username.clone(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let peer = sign_up_account(&server).await?;
        let response = server
            .put(&format!("/stores/{store_id}/managers"))
            .authorization_bearer(&manager.access_token)
            .json(&HireStaffRequest {
                handle: peer.username.clone(),
            })
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_handles_are_not_hirable() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let response = server
            .put(&format!("/stores/{store_id}/managers"))
            .authorization_bearer(&owner.access_token)
            .json(&HireStaffRequest {
                handle: "nobody@example.com".to_string(),
            })
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn dismissal_clears_the_position() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let hire = sign_up_account(&server).await?;
        let response = server
            .put(&format!("/stores/{store_id}/employees"))
            .authorization_bearer(&owner.access_token)
            .json(&HireStaffRequest {
                handle: hire.username.clone(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .delete(&format!("/stores/{store_id}/employees/{}", hire.user_id))
            .authorization_bearer(&owner.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server
            .delete(&format!("/stores/{store_id}/employees/{}", hire.user_id))
            .authorization_bearer(&owner.access_token)
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn employees_do_not_see_the_roster() -> anyhow::Result<()> {
        let (server, state) = create_test_server_and_state().await?;
        let owner = sign_up_account(&server).await?;
        grant_starter_role(&state, owner.user_id).await?;
        let store_id = create_test_store(&server, &owner).await?;

        let hire = sign_up_account(&server).await?;
        let response = server
            .put(&format!("/stores/{store_id}/employees"))
            .authorization_bearer(&owner.access_token)
            .json(&HireStaffRequest {
                handle: hire.username.clone(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/stores/{store_id}/managers"))
            .authorization_bearer(&hire.access_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }
}
