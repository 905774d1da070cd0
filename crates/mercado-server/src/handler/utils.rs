//! Shared request types for the handler modules.

use mercado_postgres::types::OffsetPagination;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination parameters accepted by listing endpoints.
///
/// Both fields are optional; omitted values fall back to the defaults, so
/// plain `GET /stores` requests work without query parameters.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
#[derive(ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationRequest {
    /// The number of records to skip before starting to return results.
    pub offset: Option<u32>,

    /// The maximum number of records to return.
    pub limit: Option<u32>,
}

impl PaginationRequest {
    /// Default pagination limit.
    const DEFAULT_LIMIT: u32 = 10;
    /// Default pagination offset.
    const DEFAULT_OFFSET: u32 = 0;

    /// Returns a new [`PaginationRequest`].
    #[inline]
    pub fn new(offset: u32, limit: u32) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    /// Returns the pagination offset.
    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(Self::DEFAULT_OFFSET)
    }

    /// Returns the pagination limit.
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

impl From<PaginationRequest> for OffsetPagination {
    fn from(pagination: PaginationRequest) -> Self {
        Self::new(i64::from(pagination.limit()), i64::from(pagination.offset()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let pagination = PaginationRequest::default();
        assert_eq!(pagination.offset(), 0);
        assert_eq!(pagination.limit(), 10);
    }

    #[test]
    fn converts_into_query_pagination() {
        let pagination = OffsetPagination::from(PaginationRequest::new(40, 20));
        assert_eq!(pagination.limit, 20);
        assert_eq!(pagination.offset, 40);
    }
}
