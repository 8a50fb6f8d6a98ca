//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; the shape of each response body is decided there.

use std::fmt;

use super::user::ValidationErrors;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request body or path could not be decoded.
    InvalidRequest,
    /// The addressed resource does not exist.
    NotFound,
    /// Submitted fields failed one or more validation rules.
    ValidationFailed,
    /// The store rejected a write that collides with existing data.
    Conflict,
    /// A store statement failed; the statement text travels with the error.
    StoreFailure,
    /// An unexpected error occurred inside the service.
    InternalError,
}

/// Domain error payload.
///
/// # Examples
/// ```
/// use users_api::domain::{Error, ErrorCode};
///
/// let err = Error::store("table users does not exist", "SELECT * FROM users");
/// assert_eq!(err.code(), ErrorCode::StoreFailure);
/// assert_eq!(err.sql(), Some("SELECT * FROM users"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    sql: Option<String>,
    violations: ValidationErrors,
}

impl Error {
    /// Create an error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            sql: None,
            violations: ValidationErrors::default(),
        }
    }

    /// Stable machine-readable error code.
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Text of the statement that failed, for store failures.
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// Failed validation rules; empty unless the code is
    /// [`ErrorCode::ValidationFailed`].
    pub const fn violations(&self) -> &ValidationErrors {
        &self.violations
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Wrap a failed store statement.
    pub fn store(message: impl Into<String>, sql: impl Into<String>) -> Self {
        let mut error = Self::new(ErrorCode::StoreFailure, message);
        error.sql = Some(sql.into());
        error
    }

    /// Wrap the rules a request failed.
    pub fn validation(violations: ValidationErrors) -> Self {
        let mut error = Self::new(ErrorCode::ValidationFailed, violations.to_string());
        error.violations = violations;
        error
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}
