//! Driven port for the relational user store and its errors.
use async_trait::async_trait;

use crate::domain::{NewUser, User, UserChanges, UserId, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    ///
    /// Every variant carries the store's own message and the text of the
    /// statement that failed, so callers can report both verbatim.
    pub enum UserPersistenceError {
        /// No store connection was available to run the statement.
        Connection { message: String, sql: String } =>
            "user store connection failed: {message}",
        /// The statement failed during execution.
        Query { message: String, sql: String } =>
            "user store query failed: {message}",
        /// The store rejected a write that repeats an existing email.
        DuplicateEmail { message: String, sql: String } =>
            "user store rejected a duplicate email: {message}",
    }
}

impl UserPersistenceError {
    /// Store message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            Self::Connection { message, .. }
            | Self::Query { message, .. }
            | Self::DuplicateEmail { message, .. } => message,
        }
    }

    /// Text of the statement that failed.
    pub fn sql(&self) -> &str {
        match self {
            Self::Connection { sql, .. }
            | Self::Query { sql, .. }
            | Self::DuplicateEmail { sql, .. } => sql,
        }
    }
}

/// Port over the `users` table.
///
/// Each method issues exactly one statement. Callers sequence them; nothing
/// here is transactional.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Return every stored row, password included, in id order.
    async fn list(&self) -> Result<Vec<UserRecord>, UserPersistenceError>;

    /// Insert a user and return the store-assigned identifier.
    async fn insert(&self, user: &NewUser) -> Result<UserId, UserPersistenceError>;

    /// Set the present fields of `changes` on the row with the given id.
    ///
    /// Returns the number of rows touched. `changes` must not be empty.
    async fn update(&self, id: UserId, changes: &UserChanges)
    -> Result<u64, UserPersistenceError>;

    /// Fetch the public view of a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;
}
