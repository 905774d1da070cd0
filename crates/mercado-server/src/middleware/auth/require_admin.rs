use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::extract::{AuthProvider, AuthState};

/// Requires the authenticated account to hold administrator standing.
///
/// Authenticated callers without admin standing receive `403 Forbidden`,
/// distinct from the `401` produced by a missing or invalid token.
///
/// #### Notes
///
/// - [`AuthState`] can't be extracted from requests without a *verified* `Authorization` token.
/// - See [`require_authentication`](super::require_authentication) for more information.
pub async fn require_admin(auth_state: AuthState, request: Request, next: Next) -> Response {
    if let Err(error) = auth_state.authorize_admin() {
        return error.into_response();
    }

    next.run(request).await
}
