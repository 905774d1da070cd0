//! Database enumerations backed by PostgreSQL enum types.

mod staff_position;

pub use staff_position::StaffPosition;
