//! Driving port for user writes.

use async_trait::async_trait;

use crate::domain::{Error, User, UserFields, UserId};

/// Domain use-case port for creating and updating users.
///
/// Both operations validate the submitted fields, perform one mutation, and
/// answer with a fresh read of the affected row.
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Validate and insert a new user.
    async fn create_user(&self, fields: UserFields) -> Result<User, Error>;

    /// Validate and apply a partial update to an existing user.
    async fn update_user(&self, id: UserId, fields: UserFields) -> Result<User, Error>;
}
