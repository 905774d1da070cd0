//! Account and role constraint violation error handlers.

use mercado_postgres::types::{RoleConstraints, UserConstraints, UserRoleConstraints};

use crate::handler::{Error, ErrorKind};

impl From<UserConstraints> for Error<'static> {
    fn from(constraint: UserConstraints) -> Self {
        let error = match constraint {
            UserConstraints::UsernameLength => ErrorKind::BadRequest
                .with_message("Username must be between 3 and 24 characters long"),
            UserConstraints::UsernameFormat => ErrorKind::BadRequest
                .with_message("Username may only contain lowercase letters and digits"),
            UserConstraints::EmailAddressLengthMax => {
                ErrorKind::BadRequest.with_message("Email address is too long")
            }
            UserConstraints::PasswordHashNotEmpty => {
                ErrorKind::BadRequest.with_message("Password cannot be empty")
            }
            // Admin flags are managed by the server, never by client input.
            UserConstraints::PrincipalImpliesAdmin => ErrorKind::InternalServerError.into_error(),
            UserConstraints::UsernameUnique => {
                ErrorKind::Conflict.with_message("This username is already taken")
            }
            UserConstraints::EmailAddressUnique => ErrorKind::Conflict
                .with_message("An account with this email address already exists"),
            UserConstraints::PrincipalAdminUnique => {
                ErrorKind::Conflict.with_message("A principal administrator already exists")
            }
        };

        error.with_resource("account")
    }
}

impl From<UserRoleConstraints> for Error<'static> {
    fn from(constraint: UserRoleConstraints) -> Self {
        let error = match constraint {
            UserRoleConstraints::Pkey => {
                ErrorKind::Conflict.with_message("This role is already assigned to the user")
            }
        };

        error.with_resource("role")
    }
}

impl From<RoleConstraints> for Error<'static> {
    fn from(constraint: RoleConstraints) -> Self {
        let error = match constraint {
            RoleConstraints::NameLength => ErrorKind::BadRequest
                .with_message("Role name must be between 2 and 64 characters long"),
            RoleConstraints::LimitsNonNegative => {
                ErrorKind::BadRequest.with_message("Role limits cannot be negative")
            }
            RoleConstraints::NameUnique => {
                ErrorKind::Conflict.with_message("A role with this name already exists")
            }
        };

        error.with_resource("role")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_username_is_a_conflict() {
        let error: Error<'static> = UserConstraints::UsernameUnique.into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("account"));
    }

    #[test]
    fn username_length_is_a_bad_request() {
        let error: Error<'static> = UserConstraints::UsernameLength.into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn duplicate_role_assignment_is_a_conflict() {
        let error: Error<'static> = UserRoleConstraints::Pkey.into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.resource(), Some("role"));
    }
}
