use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::AuthState;

/// Requires a valid session token to proceed with the request.
///
/// #### Notes
///
/// - [`AuthHeader`](crate::extract::AuthHeader) can't be extracted from requests without an `Authorization` header.
/// - [`AuthState`] can't be extracted from requests without a *verified* `Authorization` token.
pub async fn require_authentication(
    AuthState(_): AuthState,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
