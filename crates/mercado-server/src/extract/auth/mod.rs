//! Authentication and authorization primitives.
//!
//! [`AuthHeader`] validates the session token, [`AuthState`] resolves it to
//! the live account, and [`AuthProvider`] answers permission questions for
//! whoever carries that account.

mod auth_provider;
mod auth_state;
mod jwt_header;
mod permission;

pub use crate::extract::auth::auth_provider::AuthProvider;
pub use crate::extract::auth::auth_state::AuthState;
pub use crate::extract::auth::jwt_header::{AuthClaims, AuthHeader};
pub use crate::extract::auth::permission::{
    AuthResult, StoreAccess, StorePermission, StoreRole,
};

impl AuthProvider for AuthState {
    fn user_id(&self) -> uuid::Uuid {
        self.0.id
    }

    fn is_admin(&self) -> bool {
        self.0.is_admin
    }

    fn is_principal_admin(&self) -> bool {
        self.0.is_principal_admin
    }
}
