//! Live account state for authenticated requests.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use mercado_postgres::PgClient;
use mercado_postgres::model::User;
use mercado_postgres::query::UserRepository;

use crate::extract::auth::AuthHeader;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::SessionKeys;

const TRACING_TARGET: &str = "mercado::extract::authentication";

/// Extracts the authenticated account behind the request's session token.
///
/// Builds on [`AuthHeader`]: after the token is validated, the account row
/// is re-fetched so deleted accounts and revoked admin standing take effect
/// immediately instead of surviving until the token expires.
#[must_use]
#[derive(Debug, Clone, Deref)]
pub struct AuthState(pub User);

impl AuthState {
    /// Consumes the extractor and returns the account.
    #[inline]
    pub fn into_user(self) -> User {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
    PgClient: FromRef<S>,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Fetched once per request, then shared through extensions.
        if let Some(auth_state) = parts.extensions.get::<AuthState>() {
            return Ok(auth_state.clone());
        }

        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        let auth_claims = auth_header.into_claims();

        let postgres = PgClient::from_ref(state);
        let mut conn = postgres.get_connection().await?;

        let Some(user) = conn.find_user_by_id(auth_claims.user_id).await? else {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %auth_claims.user_id,
                "session token references a missing account"
            );
            return Err(ErrorKind::Unauthorized
                .with_context("Account no longer exists")
                .with_resource("authentication"));
        };

        let auth_state = Self(user);
        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthState
where
    S: Send + Sync,
    PgClient: FromRef<S>,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(auth_state) => Ok(Some(auth_state)),
            Err(_) => Ok(None),
        }
    }
}
