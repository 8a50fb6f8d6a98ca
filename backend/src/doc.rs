//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the users endpoints and the schema wrappers for the
//! domain types they return. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::inbound::http::error::{
    ErrorBody, StoreErrorBody, ValidationErrorBody, ValidationErrorEntry,
};
use crate::inbound::http::schemas::{UserRecordSchema, UserSchema};
use crate::inbound::http::users::UserPayload;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "Create, update, and list users backed by PostgreSQL."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
    ),
    components(schemas(
        UserSchema,
        UserRecordSchema,
        UserPayload,
        ErrorBody,
        StoreErrorBody,
        ValidationErrorBody,
        ValidationErrorEntry,
    )),
    tags(
        (name = "users", description = "Operations related to users")
    )
)]
pub struct ApiDoc;
