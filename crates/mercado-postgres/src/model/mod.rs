//! Database models for all entities in the system.
//!
//! This module contains Diesel model definitions for all database tables,
//! including structs for querying, inserting, and updating records.

mod app_report;
mod product;
mod product_report;
mod role;
mod store;
mod store_staff;
mod user;
mod user_role;

// Report models
pub use app_report::{AppReport, NewAppReport};
// Store models
pub use product::{NewProduct, Product, UpdateProduct};
pub use product_report::{NewProductReport, ProductReport};
// Identity and role models
pub use role::{NewRole, Role, UpdateRole};
pub use store::{NewStore, Store, UpdateStore};
pub use store_staff::{NewStoreStaff, StoreStaff};
pub use user::{NewUser, UpdateUser, User};
pub use user_role::NewUserRole;
