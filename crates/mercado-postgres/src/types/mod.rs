//! Contains constraints, enumerations and other custom types.

mod constraints;
mod enums;
mod pagination;
mod quota;

pub use constraints::{
    AppReportConstraints, ConstraintCategory, ConstraintViolation, ProductConstraints,
    ProductReportConstraints, RoleConstraints, StoreConstraints, StoreStaffConstraints,
    UserConstraints, UserRoleConstraints,
};
pub use enums::StaffPosition;
pub use pagination::{MAX_LIMIT, OffsetPagination};
pub use quota::QuotaKind;
