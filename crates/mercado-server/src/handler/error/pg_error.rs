//! Database error to HTTP error conversion.
//!
//! Maps [`PgError`] values onto the HTTP error taxonomy. Constraint
//! violations are routed through the per-table conversions so the client
//! sees a precise message; everything else is an internal error logged at
//! full detail and returned as a generic body.

use mercado_postgres::PgError;
use mercado_postgres::error::DieselError;
use mercado_postgres::types::ConstraintViolation;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "mercado::handler::pg_errors";

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        match constraint {
            ConstraintViolation::User(c) => c.into(),
            ConstraintViolation::UserRole(c) => c.into(),
            ConstraintViolation::Role(c) => c.into(),
            ConstraintViolation::Store(c) => c.into(),
            ConstraintViolation::StoreStaff(c) => c.into(),
            ConstraintViolation::Product(c) => c.into(),
            ConstraintViolation::ProductReport(c) => c.into(),
            ConstraintViolation::AppReport(c) => c.into(),
        }
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        match error {
            PgError::Config(config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout",
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            // Lookups inside repository transactions surface missing rows
            // as `NotFound` instead of an unconstrained query failure.
            PgError::Query(DieselError::NotFound) => ErrorKind::NotFound.into_error(),
            PgError::Query(ref query_error) => {
                if let Some(constraint_name) = error.constraint()
                    && let Some(constraint) = ConstraintViolation::new(constraint_name)
                {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        constraint = constraint_name,
                        error = %query_error,
                        "query error (constraint violation)"
                    );
                    return constraint.into();
                }

                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

// Used only for transactions.
impl From<DieselError> for Error<'static> {
    fn from(error: DieselError) -> Self {
        let pg_error: PgError = error.into();
        pg_error.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_maps_to_not_found() {
        let error: Error<'static> = PgError::Query(DieselError::NotFound).into();
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unexpected_maps_to_internal() {
        let error: Error<'static> = PgError::Unexpected("pool poisoned".into()).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }

    #[test]
    fn known_constraint_maps_through_table_conversion() {
        let constraint = ConstraintViolation::new("users_username_unique_idx")
            .expect("constraint name is registered");
        let error: Error<'static> = constraint.into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }
}
