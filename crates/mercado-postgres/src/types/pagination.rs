//! Offset-based pagination for database queries.

use serde::{Deserialize, Serialize};

/// Maximum number of items per page.
pub const MAX_LIMIT: i64 = 1000;

/// Offset-based pagination parameters for database queries.
///
/// Every listing query takes one of these; out-of-range values are clamped
/// on construction rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetPagination {
    /// Maximum number of records to return.
    pub limit: i64,
    /// Number of records to skip.
    pub offset: i64,
}

impl OffsetPagination {
    /// Creates a new pagination instance.
    ///
    /// The limit is clamped to `1..=MAX_LIMIT` and the offset to non-negative.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset: offset.max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_new_clamps() {
        let pagination = OffsetPagination::new(25, 100);
        assert_eq!(pagination.limit, 25);
        assert_eq!(pagination.offset, 100);

        let clamped = OffsetPagination::new(0, -5);
        assert_eq!(clamped.limit, 1);
        assert_eq!(clamped.offset, 0);

        let capped = OffsetPagination::new(100_000, 0);
        assert_eq!(capped.limit, MAX_LIMIT);
    }
}
