//! [`Error`], [`ErrorKind`] and [`Result`].

mod http_error;
mod pg_error;
mod pg_marketplace;
mod pg_users;

pub use http_error::{Error, ErrorKind, Result};
