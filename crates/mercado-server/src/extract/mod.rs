//! Request extractors used across the handler modules.

pub mod auth;
pub mod reject;

pub use crate::extract::auth::{
    AuthClaims, AuthHeader, AuthProvider, AuthResult, AuthState, StoreAccess, StorePermission,
    StoreRole,
};
pub use crate::extract::reject::{Json, Path, Query, ValidateJson};
