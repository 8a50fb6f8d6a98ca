//! User domain service.
//!
//! Implements the user driving ports over a [`UserRepository`]. Writes are a
//! mutation followed by an independent read-back of the affected row; the two
//! statements are not atomic, so a concurrent write to the same row may be
//! what the read-back observes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{UserPersistenceError, UserRepository, UsersCommand, UsersQuery};
use crate::domain::{Error, NewUser, User, UserChanges, UserFields, UserId, UserRecord};

/// Message returned when an update collides with another user's email.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already exists";
/// Message returned when the addressed user does not exist.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// Report any store failure verbatim, duplicate emails included.
fn map_store_error(error: UserPersistenceError) -> Error {
    if let UserPersistenceError::Connection { message, .. } = &error {
        warn!(%message, "user store connection unavailable");
    }
    match error {
        UserPersistenceError::Connection { message, sql }
        | UserPersistenceError::Query { message, sql }
        | UserPersistenceError::DuplicateEmail { message, sql } => Error::store(message, sql),
    }
}

/// Update-path mapping: duplicate emails are a conflict, not a store failure.
fn map_update_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict(DUPLICATE_EMAIL_MESSAGE),
        other => map_store_error(other),
    }
}

/// User service implementing the query and command driving ports.
pub struct UserService<R: ?Sized> {
    user_repo: Arc<R>,
}

impl<R: ?Sized> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            user_repo: Arc::clone(&self.user_repo),
        }
    }
}

impl<R: ?Sized> UserService<R> {
    /// Create a new service over the user repository.
    pub const fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }
}

impl<R> UserService<R>
where
    R: UserRepository + ?Sized,
{
    async fn read_back(&self, id: UserId) -> Result<Option<User>, Error> {
        self.user_repo
            .find_by_id(id)
            .await
            .map_err(map_store_error)
    }
}

#[async_trait]
impl<R> UsersQuery for UserService<R>
where
    R: UserRepository + ?Sized,
{
    async fn list_users(&self) -> Result<Vec<UserRecord>, Error> {
        self.user_repo.list().await.map_err(map_store_error)
    }
}

#[async_trait]
impl<R> UsersCommand for UserService<R>
where
    R: UserRepository + ?Sized,
{
    async fn create_user(&self, fields: UserFields) -> Result<User, Error> {
        let new_user = NewUser::try_from_fields(&fields).map_err(Error::validation)?;

        // Unlike update, a duplicate email on insert stays a store failure.
        let id = self
            .user_repo
            .insert(&new_user)
            .await
            .map_err(map_store_error)?;
        info!(user_id = %id, "user created");

        self.read_back(id)
            .await?
            .ok_or_else(|| Error::internal(format!("user {id} vanished after insert")))
    }

    async fn update_user(&self, id: UserId, fields: UserFields) -> Result<User, Error> {
        let changes = UserChanges::try_from_fields(&fields).map_err(Error::validation)?;

        if changes.is_empty() {
            info!(user_id = %id, "update carried no recognised fields; reading back only");
        } else {
            let touched = self
                .user_repo
                .update(id, &changes)
                .await
                .map_err(map_update_error)?;
            info!(user_id = %id, rows = touched, "user updated");
        }

        self.read_back(id)
            .await?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
