//! HTTP adapter mapping for domain errors.
//!
//! The domain error stays HTTP-agnostic; this module decides the status and
//! the JSON body clients see for each error class.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, FieldViolation, TraceId};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Message clients see in place of an internal error's own text.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Body of 400, 404, 409 and redacted 500 responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

/// Body of a 500 response caused by a failed store statement.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoreErrorBody {
    /// Store message, verbatim.
    pub error: String,
    /// Text of the statement that failed.
    pub sql: String,
}

/// One failed validation rule.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorEntry {
    /// Submitted value; omitted when absent and never sent for passwords.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Rule that failed.
    pub msg: String,
    /// Body field the rule applies to.
    pub param: String,
    /// Where the field was read from; always `body`.
    pub location: String,
}

impl From<&FieldViolation> for ValidationErrorEntry {
    fn from(violation: &FieldViolation) -> Self {
        Self {
            value: violation.value().map(str::to_owned),
            msg: violation.error().to_string(),
            param: violation.field().as_str().to_owned(),
            location: "body".to_owned(),
        }
    }
}

/// Body of a 422 response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorBody {
    /// Every failed rule, in field order.
    pub errors: Vec<ValidationErrorEntry>,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::StoreFailure | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_error(error: &Error, status: StatusCode) {
    let trace_id = TraceId::current().map(|id| id.to_string());
    if status.is_server_error() {
        error!(
            trace_id = trace_id.as_deref(),
            code = ?error.code(),
            message = error.message(),
            sql = error.sql(),
            "request failed"
        );
    } else {
        warn!(
            trace_id = trace_id.as_deref(),
            code = ?error.code(),
            message = error.message(),
            "request rejected"
        );
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        log_error(self, status);
        let mut builder = HttpResponse::build(status);

        match self.code() {
            ErrorCode::ValidationFailed => builder.json(ValidationErrorBody {
                errors: self
                    .violations()
                    .iter()
                    .map(ValidationErrorEntry::from)
                    .collect(),
            }),
            ErrorCode::StoreFailure => builder.json(StoreErrorBody {
                error: self.message().to_owned(),
                sql: self.sql().unwrap_or_default().to_owned(),
            }),
            ErrorCode::InternalError => builder.json(ErrorBody {
                error: INTERNAL_ERROR_MESSAGE.to_owned(),
            }),
            _ => builder.json(ErrorBody {
                error: self.message().to_owned(),
            }),
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_ERROR_MESSAGE)
    }
}
