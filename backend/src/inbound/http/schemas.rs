//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their serialised shape and register under the
//! domain type's name.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::User`].
///
/// Public view of a user; the password is never part of it.
#[derive(ToSchema)]
#[schema(as = crate::domain::User)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Store-assigned identifier.
    #[schema(example = 1)]
    id: i64,
    /// Unique email address.
    #[schema(example = "a@b.com")]
    email: String,
    /// Display name, at least two characters.
    #[schema(example = "Al")]
    name: String,
}

/// OpenAPI schema for [`crate::domain::UserRecord`].
///
/// Full stored row as returned by `GET /api/users`, password included.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserRecord)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserRecordSchema {
    #[schema(example = 1)]
    id: i64,
    #[schema(example = "a@b.com")]
    email: String,
    #[schema(example = "Al")]
    name: String,
    #[schema(example = "longenough")]
    password: String,
}
