//! Security infrastructure services.
//!
//! Password hashing and session signing key management used by the
//! authentication handlers.

mod password_hasher;
mod session_keys;

pub use password_hasher::PasswordHasher;
pub use session_keys::{SessionKeys, SessionKeysConfig};
