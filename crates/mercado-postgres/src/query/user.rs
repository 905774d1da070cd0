//! User repository for identity and administrative standing.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::model::{NewUser, UpdateUser, User};
use crate::types::OffsetPagination;
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for user database operations.
///
/// Handles registration, lookup by the login handles, and the promotion and
/// demotion of administrators. Admin standing lives on the row itself, so
/// callers always read the current flags rather than anything token-borne.
pub trait UserRepository {
    /// Creates a new user account.
    ///
    /// The username and email address are stored trimmed and lower-cased so
    /// lookups stay case-insensitive.
    fn create_user(&mut self, new_user: NewUser) -> impl Future<Output = PgResult<User>> + Send;

    /// Creates the very first administrator.
    ///
    /// Succeeds only while no admin exists; the created user receives both
    /// the admin and the principal admin flag. Returns `None` once any admin
    /// is present. The check and the insert run in one transaction, and the
    /// partial unique index on `is_principal_admin` backstops a concurrent
    /// bootstrap, so at most one caller can ever win.
    fn create_first_admin(
        &mut self,
        new_user: NewUser,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Finds a user by their unique identifier.
    fn find_user_by_id(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Finds a user by username.
    ///
    /// Comparison is case-insensitive.
    fn find_user_by_username(
        &mut self,
        username: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Finds a user by email address.
    ///
    /// Comparison is case-insensitive.
    fn find_user_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Finds a user by a single login handle holding either a username or an
    /// email address.
    ///
    /// Usernames are alphanumeric, so a handle containing `@` can only be an
    /// email address.
    fn find_user_by_handle(
        &mut self,
        handle: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Lists user accounts ordered by creation time, most recent first.
    fn list_users(
        &mut self,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<User>>> + Send;

    /// Lists all users holding admin standing.
    fn list_admins(&mut self) -> impl Future<Output = PgResult<Vec<User>>> + Send;

    /// Returns whether any administrator exists.
    fn admin_exists(&mut self) -> impl Future<Output = PgResult<bool>> + Send;

    /// Grants admin standing to a user.
    ///
    /// Returns `None` when the user is absent or already an admin; the
    /// update only matches rows without the flag, so a repeated promotion
    /// cannot report success twice.
    fn promote_to_admin(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Revokes admin standing from a user.
    ///
    /// The principal admin is never matched by this update. Returns `None`
    /// when no demotable admin row exists for the id.
    fn demote_from_admin(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;
}

impl UserRepository for PgConnection {
    async fn create_user(&mut self, mut new_user: NewUser) -> PgResult<User> {
        use schema::users;

        new_user.username = new_user.username.trim().to_lowercase();
        new_user.email_address = new_user.email_address.trim().to_lowercase();

        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn create_first_admin(&mut self, mut new_user: NewUser) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        new_user.username = new_user.username.trim().to_lowercase();
        new_user.email_address = new_user.email_address.trim().to_lowercase();
        new_user.is_admin = true;
        new_user.is_principal_admin = true;

        self.build_transaction()
            .run(|conn| {
                async move {
                    let admins: i64 = users::table
                        .filter(dsl::is_admin.eq(true))
                        .count()
                        .get_result(conn)
                        .await?;
                    if admins > 0 {
                        return Ok(None);
                    }

                    let user = diesel::insert_into(users::table)
                        .values(&new_user)
                        .returning(User::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok::<Option<User>, PgError>(Some(user))
                }
                .scope_boxed()
            })
            .await
    }

    async fn find_user_by_id(&mut self, user_id: Uuid) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::id.eq(user_id))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_user_by_username(&mut self, username: &str) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::username.eq(username.trim().to_lowercase()))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_user_by_email(&mut self, email: &str) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::email_address.eq(email.trim().to_lowercase()))
            .select(User::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_user_by_handle(&mut self, handle: &str) -> PgResult<Option<User>> {
        if handle.contains('@') {
            self.find_user_by_email(handle).await
        } else {
            self.find_user_by_username(handle).await
        }
    }

    async fn list_users(&mut self, pagination: OffsetPagination) -> PgResult<Vec<User>> {
        use schema::users::{self, dsl};

        users::table
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(User::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_admins(&mut self) -> PgResult<Vec<User>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::is_admin.eq(true))
            .order(dsl::created_at.asc())
            .select(User::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn admin_exists(&mut self) -> PgResult<bool> {
        use schema::users::{self, dsl};

        let admins: i64 = users::table
            .filter(dsl::is_admin.eq(true))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(admins > 0)
    }

    async fn promote_to_admin(&mut self, user_id: Uuid) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        diesel::update(
            users::table
                .filter(dsl::id.eq(user_id))
                .filter(dsl::is_admin.eq(false)),
        )
        .set(UpdateUser {
            is_admin: Some(true),
            ..Default::default()
        })
        .returning(User::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)
    }

    async fn demote_from_admin(&mut self, user_id: Uuid) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        diesel::update(
            users::table
                .filter(dsl::id.eq(user_id))
                .filter(dsl::is_admin.eq(true))
                .filter(dsl::is_principal_admin.eq(false)),
        )
        .set(UpdateUser {
            is_admin: Some(false),
            ..Default::default()
        })
        .returning(User::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)
    }
}
