//! Application report model.
//!
//! Application reports flag platform-wide problems. Unlike product reports
//! they carry a `solved` flag that administrators flip exactly once through
//! a conditional update.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::app_reports;

/// A report about the application itself.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = app_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AppReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// The user who filed the report.
    pub author_id: Uuid,
    /// Short summary of the issue (1-120 characters).
    pub title: String,
    /// Detailed description of the issue.
    pub description: String,
    /// Optional URL to a supporting image.
    pub image_url: Option<String>,
    /// Whether an administrator has resolved the report.
    pub solved: bool,
    /// Timestamp when the report was filed.
    pub created_at: Timestamp,
    /// Timestamp when the report was last updated.
    pub updated_at: Timestamp,
}

/// Data for filing a new application report.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = app_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAppReport {
    /// The user filing the report.
    pub author_id: Uuid,
    /// Short summary of the issue (1-120 characters).
    pub title: String,
    /// Detailed description of the issue.
    pub description: String,
    /// Optional URL to a supporting image.
    pub image_url: Option<String>,
}
