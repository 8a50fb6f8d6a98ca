//! Driving port for user reads.
//!
//! Inbound adapters (HTTP handlers) use this port to fetch user data without
//! importing outbound persistence concerns.

use async_trait::async_trait;

use crate::domain::{Error, UserRecord};

/// Domain use-case port for listing users.
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return every stored user.
    async fn list_users(&self) -> Result<Vec<UserRecord>, Error>;
}
