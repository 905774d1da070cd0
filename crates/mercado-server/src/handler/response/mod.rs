//! Response types shared across HTTP handlers.

mod error_response;

pub use error_response::ErrorResponse;
