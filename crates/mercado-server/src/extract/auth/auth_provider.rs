//! Authorization checks shared by request handlers.

use mercado_postgres::model::Store;
use mercado_postgres::query::{StoreRepository, StoreStaffRepository};
use mercado_postgres::{PgConn, PgError};
use uuid::Uuid;

use crate::extract::auth::{AuthResult, StoreAccess, StorePermission, StoreRole};
use crate::handler::{ErrorKind, Result};

const TRACING_TARGET: &str = "mercado::authorization";

/// Answers authorization questions on behalf of an authenticated account.
///
/// Implementors only supply the account's identity; the permission logic
/// lives in the default methods so every caller resolves access the same
/// way. Checks prefixed with `authorize_` convert a denial into an error,
/// which lets handlers chain them with `?`.
pub trait AuthProvider {
    /// Identifier of the account performing the request.
    fn user_id(&self) -> Uuid;

    /// Whether the account holds global administrator standing.
    fn is_admin(&self) -> bool;

    /// Whether the account is the principal administrator.
    fn is_principal_admin(&self) -> bool;

    /// Evaluates a store permission against an already-loaded store.
    ///
    /// Administrators bypass the store's role hierarchy, the author holds
    /// every permission, and staff members are checked against the role
    /// their position maps onto.
    #[allow(async_fn_in_trait)]
    async fn check_store_permission(
        &self,
        conn: &mut PgConn,
        store: &Store,
        permission: StorePermission,
    ) -> Result<AuthResult, PgError> {
        let user_id = self.user_id();

        if self.is_admin() {
            tracing::debug!(
                target: TRACING_TARGET,
                user_id = %user_id,
                store_id = %store.id,
                permission = ?permission,
                "access granted: global administrator"
            );
            return Ok(AuthResult::Granted(StoreAccess::Admin));
        }

        if store.is_owned_by(user_id) {
            tracing::debug!(
                target: TRACING_TARGET,
                user_id = %user_id,
                store_id = %store.id,
                permission = ?permission,
                "access granted: store author"
            );
            return Ok(AuthResult::Granted(StoreAccess::Author));
        }

        let Some(position) = conn.staff_position(store.id, user_id).await? else {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %user_id,
                store_id = %store.id,
                permission = ?permission,
                "access denied: not on the store's staff"
            );
            return Ok(AuthResult::denied("Not a member of this store's staff"));
        };

        if permission.is_permitted_by_role(StoreRole::from(position)) {
            tracing::debug!(
                target: TRACING_TARGET,
                user_id = %user_id,
                store_id = %store.id,
                position = %position,
                permission = ?permission,
                "access granted: staff position"
            );
            Ok(AuthResult::Granted(StoreAccess::Staff(position)))
        } else {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %user_id,
                store_id = %store.id,
                position = %position,
                permission = ?permission,
                "access denied: insufficient position"
            );
            Ok(AuthResult::denied(format!(
                "Position {position} does not grant the {permission:?} permission"
            )))
        }
    }

    /// Loads a store and requires the given permission on it.
    ///
    /// Returns `NotFound` when the store does not exist, `Forbidden` when
    /// the caller lacks the permission, and the store together with the
    /// granted access otherwise.
    #[allow(async_fn_in_trait)]
    async fn authorize_store(
        &self,
        conn: &mut PgConn,
        store_id: Uuid,
        permission: StorePermission,
    ) -> Result<(Store, StoreAccess)> {
        let Some(store) = conn.find_store_by_id(store_id).await? else {
            return Err(ErrorKind::NotFound.with_resource("store"));
        };

        let access = self
            .check_store_permission(conn, &store, permission)
            .await?
            .into_result()?;

        Ok((store, access))
    }

    /// Requires the target account to be the caller itself or an admin.
    fn authorize_self(&self, target_user_id: Uuid) -> Result<()> {
        if self.user_id() == target_user_id || self.is_admin() {
            return Ok(());
        }

        tracing::warn!(
            target: TRACING_TARGET,
            user_id = %self.user_id(),
            target_user_id = %target_user_id,
            "access denied: account belongs to someone else"
        );
        Err(ErrorKind::Forbidden
            .with_context("You can only manage your own account")
            .with_resource("account"))
    }

    /// Requires global administrator standing.
    fn authorize_admin(&self) -> Result<()> {
        if self.is_admin() {
            return Ok(());
        }

        tracing::warn!(
            target: TRACING_TARGET,
            user_id = %self.user_id(),
            "access denied: administrator standing required"
        );
        Err(ErrorKind::Forbidden
            .with_context("Administrator privileges required")
            .with_resource("account"))
    }

    /// Requires principal administrator standing.
    fn authorize_principal(&self) -> Result<()> {
        if self.is_principal_admin() {
            return Ok(());
        }

        tracing::warn!(
            target: TRACING_TARGET,
            user_id = %self.user_id(),
            "access denied: principal administrator standing required"
        );
        Err(ErrorKind::Forbidden
            .with_context("Principal administrator privileges required")
            .with_resource("account"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Caller {
        id: Uuid,
        admin: bool,
        principal: bool,
    }

    impl Caller {
        fn regular() -> Self {
            Self {
                id: Uuid::new_v4(),
                admin: false,
                principal: false,
            }
        }

        fn admin() -> Self {
            Self {
                id: Uuid::new_v4(),
                admin: true,
                principal: false,
            }
        }

        fn principal() -> Self {
            Self {
                id: Uuid::new_v4(),
                admin: true,
                principal: true,
            }
        }
    }

    impl AuthProvider for Caller {
        fn user_id(&self) -> Uuid {
            self.id
        }

        fn is_admin(&self) -> bool {
            self.admin
        }

        fn is_principal_admin(&self) -> bool {
            self.principal
        }
    }

    #[test]
    fn accounts_manage_themselves() {
        let caller = Caller::regular();
        assert!(caller.authorize_self(caller.id).is_ok());

        let error = caller.authorize_self(Uuid::new_v4()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn admins_manage_any_account() {
        let caller = Caller::admin();
        assert!(caller.authorize_self(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn admin_checks_reject_regular_accounts() {
        let error = Caller::regular().authorize_admin().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert!(Caller::admin().authorize_admin().is_ok());
    }

    #[test]
    fn principal_checks_reject_ordinary_admins() {
        let error = Caller::admin().authorize_principal().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert!(Caller::principal().authorize_principal().is_ok());
    }
}
