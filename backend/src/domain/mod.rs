//! Domain primitives, ports, and services.
//!
//! Purpose: Define strongly typed user entities and the use-cases the HTTP
//! adapter drives. Nothing in here knows about actix-web or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, UserRecord, NewUser, UserChanges, UserFields: user data model.
//! - TraceId: request-scoped correlation identifier.
//! - UserService: implementation of the `UsersQuery` and `UsersCommand`
//!   driving ports over a `UserRepository`.

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, ExtraColumn, FieldViolation, NAME_MIN, NewUser, PASSWORD_MIN, Password, User,
    UserChanges, UserField, UserFields, UserId, UserName, UserRecord, UserValidationError,
    ValidationErrors,
};
pub use self::user_service::{DUPLICATE_EMAIL_MESSAGE, USER_NOT_FOUND_MESSAGE, UserService};
