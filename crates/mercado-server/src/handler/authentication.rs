//! Authentication handlers for account registration and login.
//!
//! Besides the regular signup and login pair, this module carries the
//! administrator bootstrap endpoints: the very first admin registers itself
//! while the system has none, and every later administrator is promoted
//! through the admin API instead. Sessions are stateless signed tokens, so
//! there is no logout endpoint; a session ends when its token expires.

use std::sync::LazyLock;

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use mercado_postgres::PgClient;
use mercado_postgres::model::NewUser;
use mercado_postgres::query::UserRepository;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthClaims, Json, ValidateJson};
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::{PasswordHasher, ServiceState, SessionKeys};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "mercado::handler::authentication";

/// Letters and digits only; the repository lowercases on insert.
static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[A-Za-z0-9]+$").unwrap()
});

/// Request payload for account registration.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "username": "ferris23",
    "emailAddress": "ferris@example.com",
    "password": "CorrectHorse9Battery"
}))]
struct SignUpRequest {
    /// Unique login handle (letters and digits).
    #[validate(
        length(min = 3, max = 24),
        regex(path = *USERNAME_PATTERN)
    )]
    pub username: String,
    /// Email address of the account.
    #[validate(email)]
    pub email_address: String,
    /// Password of the account.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Response returned after successful registration.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    /// ID of the created account.
    pub user_id: Uuid,
    /// Normalized login handle of the account.
    pub username: String,
    /// Normalized email address of the account.
    pub email_address: String,

    /// Signed session token for the `Authorization: Bearer` header.
    pub access_token: String,
    /// Timestamp when the session token was issued.
    #[schema(value_type = String, format = DateTime)]
    pub issued_at: Timestamp,
    /// Timestamp when the session token expires.
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: Timestamp,
}

/// Creates a new account and issues its first session token.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/auth/signup", tag = "auth",
    request_body(
        content = SignUpRequest,
        description = "Registration credentials",
        content_type = "application/json",
        example = json!({
            "username": "ferris23",
            "emailAddress": "ferris@example.com",
            "password": "CorrectHorse9Battery"
        })
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Invalid username, email, or password",
            body = ErrorResponse,
            example = json!({
                "name": "bad_request",
                "message": "Field 'username' must be between 3 and 24 characters long",
                "resource": "request"
            })
        ),
        (
            status = CONFLICT,
            description = "Username or email address is already taken",
            body = ErrorResponse,
            example = json!({
                "name": "conflict",
                "message": "This username is already taken",
                "resource": "account"
            })
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Account created and session token issued",
            body = SignUpResponse,
            example = json!({
                "userId": "550e8400-e29b-41d4-a716-446655440000",
                "username": "ferris23",
                "emailAddress": "ferris@example.com",
                "accessToken": "eyJhbGciOiJFZERTQSJ9...",
                "issuedAt": "2025-01-15T10:30:00Z",
                "expiresAt": "2025-01-22T10:30:00Z"
            })
        ),
    ),
)]
async fn sign_up(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    State(session_keys): State<SessionKeys>,
    ValidateJson(request): ValidateJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        username = %request.username,
        "signup attempt"
    );

    let mut conn = pg_client.get_connection().await?;
    let password_hash = password_hasher.hash_password(&request.password)?;

    let new_user = NewUser {
        username: request.username,
        email_address: request.email_address,
        password_hash,
        ..Default::default()
    };

    // Duplicate handles surface as unique constraint violations (409).
    let user = conn.create_user(new_user).await?;
    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user.id,
        username = %user.username,
        "account created"
    );

    let auth_claims = AuthClaims::new(user.id, session_keys.session_ttl());
    let access_token = auth_claims.encode(session_keys.encoding_key())?;

    let response = SignUpResponse {
        user_id: user.id,
        username: user.username,
        email_address: user.email_address,
        access_token,
        issued_at: auth_claims.issued_at,
        expires_at: auth_claims.expires_at,
    };

    tracing::info!(
        target: TRACING_TARGET,
        token_id = %auth_claims.token_id,
        user_id = %auth_claims.user_id,
        "signup successful: session token issued"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// Request payload for login.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "handle": "ferris23",
    "password": "CorrectHorse9Battery"
}))]
struct LoginRequest {
    /// Username or email address of the account.
    #[validate(length(min = 3, max = 320))]
    pub handle: String,
    /// Password of the account.
    pub password: String,
}

/// Response returned after successful login.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    /// ID of the account.
    pub user_id: Uuid,
    /// Login handle of the account.
    pub username: String,
    /// Whether the account holds administrator standing.
    pub is_admin: bool,

    /// Signed session token for the `Authorization: Bearer` header.
    pub access_token: String,
    /// Timestamp when the session token was issued.
    #[schema(value_type = String, format = DateTime)]
    pub issued_at: Timestamp,
    /// Timestamp when the session token expires.
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: Timestamp,
}

/// Issues a new session token for an existing account.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/auth/login", tag = "auth",
    request_body(
        content = LoginRequest,
        description = "Login credentials: a username or email address plus password",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Malformed payload",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Invalid credentials - account not found or password incorrect",
            body = ErrorResponse,
            example = json!({
                "name": "not_found",
                "message": "The requested resource was not found"
            })
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Session token issued",
            body = LoginResponse,
        ),
    ),
)]
async fn login(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    State(session_keys): State<SessionKeys>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        handle = %request.handle,
        "login attempt"
    );

    let mut conn = pg_client.get_connection().await?;
    let user = conn.find_user_by_handle(&request.handle).await?;

    // Keep verification time flat whether or not the account exists, so the
    // response duration does not leak which handles are registered.
    let password_valid = match &user {
        Some(user) => password_hasher
            .verify_password(&request.password, &user.password_hash)
            .is_ok(),
        None => password_hasher.verify_dummy_password(&request.password),
    };

    let Some(user) = user.filter(|_| password_valid) else {
        tracing::warn!(
            target: TRACING_TARGET,
            handle = %request.handle,
            "login failed"
        );
        return Err(ErrorKind::NotFound.into_error());
    };

    let auth_claims = AuthClaims::new(user.id, session_keys.session_ttl());
    let access_token = auth_claims.encode(session_keys.encoding_key())?;

    let response = LoginResponse {
        user_id: user.id,
        username: user.username,
        is_admin: user.is_admin,
        access_token,
        issued_at: auth_claims.issued_at,
        expires_at: auth_claims.expires_at,
    };

    tracing::info!(
        target: TRACING_TARGET,
        token_id = %auth_claims.token_id,
        user_id = %user.id,
        "login successful: session token issued"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// Registers the very first administrator account.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/auth/admin/signup", tag = "auth",
    request_body(
        content = SignUpRequest,
        description = "Registration credentials for the first administrator",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Invalid username, email, or password",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "An administrator account already exists",
            body = ErrorResponse,
            example = json!({
                "name": "forbidden",
                "message": "An administrator account already exists",
                "resource": "account"
            })
        ),
        (
            status = CONFLICT,
            description = "Username or email address is already taken",
            body = ErrorResponse,
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Principal administrator created and session token issued",
            body = SignUpResponse,
        ),
    ),
)]
async fn admin_sign_up(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    State(session_keys): State<SessionKeys>,
    ValidateJson(request): ValidateJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        username = %request.username,
        "admin bootstrap attempt"
    );

    let mut conn = pg_client.get_connection().await?;

    // A closed bootstrap is rejected before the costly hash; the repository
    // transaction below remains the one deciding a concurrent race.
    if conn.admin_exists().await? {
        tracing::warn!(
            target: TRACING_TARGET,
            "admin bootstrap rejected: an administrator already exists"
        );
        return Err(ErrorKind::Forbidden
            .with_message("An administrator account already exists")
            .with_resource("account"));
    }

    let password_hash = password_hasher.hash_password(&request.password)?;

    let new_user = NewUser {
        username: request.username,
        email_address: request.email_address,
        password_hash,
        ..Default::default()
    };

    // The repository wins the bootstrap race at most once; every caller
    // after the first sees `None` here.
    let Some(user) = conn.create_first_admin(new_user).await? else {
        tracing::warn!(
            target: TRACING_TARGET,
            "admin bootstrap rejected: an administrator already exists"
        );
        return Err(ErrorKind::Forbidden
            .with_message("An administrator account already exists")
            .with_resource("account"));
    };

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user.id,
        username = %user.username,
        "principal administrator created"
    );

    let auth_claims = AuthClaims::new(user.id, session_keys.session_ttl());
    let access_token = auth_claims.encode(session_keys.encoding_key())?;

    let response = SignUpResponse {
        user_id: user.id,
        username: user.username,
        email_address: user.email_address,
        access_token,
        issued_at: auth_claims.issued_at,
        expires_at: auth_claims.expires_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Issues a session token for an administrator account.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/auth/admin/login", tag = "auth",
    request_body(
        content = LoginRequest,
        description = "Login credentials of an administrator",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request - Malformed payload",
            body = ErrorResponse,
        ),
        (
            status = NOT_FOUND,
            description = "Invalid credentials - account not found or password incorrect",
            body = ErrorResponse,
        ),
        (
            status = FORBIDDEN,
            description = "Credentials are valid but the account is not an administrator",
            body = ErrorResponse,
        ),
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Session token issued",
            body = LoginResponse,
        ),
    ),
)]
async fn admin_login(
    State(pg_client): State<PgClient>,
    State(password_hasher): State<PasswordHasher>,
    State(session_keys): State<SessionKeys>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        handle = %request.handle,
        "admin login attempt"
    );

    let mut conn = pg_client.get_connection().await?;
    let user = conn.find_user_by_handle(&request.handle).await?;

    let password_valid = match &user {
        Some(user) => password_hasher
            .verify_password(&request.password, &user.password_hash)
            .is_ok(),
        None => password_hasher.verify_dummy_password(&request.password),
    };

    let Some(user) = user.filter(|_| password_valid) else {
        tracing::warn!(
            target: TRACING_TARGET,
            handle = %request.handle,
            "admin login failed"
        );
        return Err(ErrorKind::NotFound.into_error());
    };

    // Standing is checked only after the password, so this path reveals
    // nothing extra about accounts with wrong credentials.
    if !user.is_admin {
        tracing::warn!(
            target: TRACING_TARGET,
            user_id = %user.id,
            "admin login rejected: account lacks administrator standing"
        );
        return Err(ErrorKind::Forbidden
            .with_context("Administrator privileges required")
            .with_resource("account"));
    }

    let auth_claims = AuthClaims::new(user.id, session_keys.session_ttl());
    let access_token = auth_claims.encode(session_keys.encoding_key())?;

    let response = LoginResponse {
        user_id: user.id,
        username: user.username,
        is_admin: user.is_admin,
        access_token,
        issued_at: auth_claims.issued_at,
        expires_at: auth_claims.expires_at,
    };

    tracing::info!(
        target: TRACING_TARGET,
        token_id = %auth_claims.token_id,
        user_id = %user.id,
        "admin login successful: session token issued"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(sign_up))
        .routes(routes!(login))
        .routes(routes!(admin_sign_up))
        .routes(routes!(admin_login))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::handler::test::{
        TEST_PASSWORD, create_test_server_with_router, root_admin_payload, unique_username,
    };

    #[tokio::test]
    async fn signup_creates_an_account() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let username = unique_username();
        let signup_request = SignUpRequest {
            username: username.clone(),
            email_address: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
        };

        let response = server.post("/auth/signup").json(&signup_request).await;
        response.assert_status(StatusCode::CREATED);

        let body: SignUpResponse = response.json();
        assert_eq!(body.username, username);
        assert_eq!(body.email_address, format!("{username}@example.com"));
        assert!(!body.access_token.is_empty());
        assert!(body.expires_at > body.issued_at);

        Ok(())
    }

    #[tokio::test]
    async fn signup_normalizes_the_handles() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let username = unique_username();
        let signup_request = SignUpRequest {
            username: username.to_uppercase(),
            email_address: format!("{}@Example.COM", username.to_uppercase()),
            password: TEST_PASSWORD.to_string(),
        };

        let response = server.post("/auth/signup").json(&signup_request).await;
        response.assert_status(StatusCode::CREATED);

        let body: SignUpResponse = response.json();
        assert_eq!(body.username, username);
        assert_eq!(body.email_address, format!("{username}@example.com"));

        Ok(())
    }

    #[tokio::test]
    async fn signup_rejects_short_usernames() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let signup_request = serde_json::json!({
            "username": "ab",
            "emailAddress": "short@example.com",
            "password": TEST_PASSWORD,
        });

        let response = server.post("/auth/signup").json(&signup_request).await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_usernames() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let username = unique_username();
        let signup_request = SignUpRequest {
            username: username.clone(),
            email_address: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
        };

        let response = server.post("/auth/signup").json(&signup_request).await;
        response.assert_status(StatusCode::CREATED);

        // Same username under a fresh email address must still collide.
        let duplicate_request = SignUpRequest {
            email_address: format!("{}@example.com", unique_username()),
            ..signup_request
        };

        let response = server.post("/auth/signup").json(&duplicate_request).await;
        response.assert_status_conflict();

        Ok(())
    }

    #[tokio::test]
    async fn login_accepts_either_handle() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let username = unique_username();
        let signup_request = SignUpRequest {
            username: username.clone(),
            email_address: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
        };

        let response = server.post("/auth/signup").json(&signup_request).await;
        response.assert_status(StatusCode::CREATED);
        let created: SignUpResponse = response.json();

        let login_request = LoginRequest {
            handle: username.clone(),
            password: TEST_PASSWORD.to_string(),
        };
        let response = server.post("/auth/login").json(&login_request).await;
        response.assert_status(StatusCode::CREATED);
        let body: LoginResponse = response.json();
        assert_eq!(body.user_id, created.user_id);
        assert!(!body.is_admin);

        let login_request = LoginRequest {
            handle: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
        };
        let response = server.post("/auth/login").json(&login_request).await;
        response.assert_status(StatusCode::CREATED);
        let body: LoginResponse = response.json();
        assert_eq!(body.user_id, created.user_id);

        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_wrong_passwords() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let username = unique_username();
        let signup_request = SignUpRequest {
            username: username.clone(),
            email_address: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
        };
        server.post("/auth/signup").json(&signup_request).await;

        let login_request = LoginRequest {
            handle: username,
            password: "WrongPassword456!".to_string(),
        };

        let response = server.post("/auth/login").json(&login_request).await;
        response.assert_status(StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_unknown_handles() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let login_request = LoginRequest {
            handle: unique_username(),
            password: TEST_PASSWORD.to_string(),
        };

        let response = server.post("/auth/login").json(&login_request).await;
        response.assert_status(StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn admin_bootstrap_happens_at_most_once() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        // Only the shared root credentials may win the bootstrap; a random
        // username taking the principal slot would orphan every other test.
        // The first attempt only wins on a database without administrators.
        let first = server
            .post("/auth/admin/signup")
            .json(&root_admin_payload())
            .await;
        assert!(matches!(
            first.status_code(),
            StatusCode::CREATED | StatusCode::FORBIDDEN
        ));

        let username = unique_username();
        let second_request = SignUpRequest {
            username: username.clone(),
            email_address: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
        };

        let second = server.post("/auth/admin/signup").json(&second_request).await;
        second.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn admin_login_rejects_regular_accounts() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let username = unique_username();
        let signup_request = SignUpRequest {
            username: username.clone(),
            email_address: format!("{username}@example.com"),
            password: TEST_PASSWORD.to_string(),
        };
        server.post("/auth/signup").json(&signup_request).await;

        let login_request = LoginRequest {
            handle: username,
            password: TEST_PASSWORD.to_string(),
        };

        let response = server.post("/auth/admin/login").json(&login_request).await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }
}
