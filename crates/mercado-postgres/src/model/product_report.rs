//! Product report model.
//!
//! Product reports flag an issue with a specific product in a store. They
//! are immutable once filed; staff either act on them or delete them.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::product_reports;

/// A report filed against a product.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = product_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// The store the reported product belongs to.
    pub store_id: Uuid,
    /// The product being reported.
    pub product_id: Uuid,
    /// The user who filed the report.
    pub author_id: Uuid,
    /// Short summary of the issue (1-120 characters).
    pub title: String,
    /// Detailed description of the issue.
    pub description: String,
    /// Optional URL to a supporting image.
    pub image_url: Option<String>,
    /// Timestamp when the report was filed.
    pub created_at: Timestamp,
}

/// Data for filing a new product report.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = product_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewProductReport {
    /// The store the reported product belongs to.
    pub store_id: Uuid,
    /// The product being reported.
    pub product_id: Uuid,
    /// The user filing the report.
    pub author_id: Uuid,
    /// Short summary of the issue (1-120 characters).
    pub title: String,
    /// Detailed description of the issue.
    pub description: String,
    /// Optional URL to a supporting image.
    pub image_url: Option<String>,
}
