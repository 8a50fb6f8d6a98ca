//! Users API handlers.
//!
//! ```text
//! GET /api/users
//! POST /api/users {"email":"a@b.com","password":"longenough","name":"Al"}
//! PUT /api/users/1 {"name":"Ale"}
//! ```

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, post, put, web};
use utoipa::ToSchema;

use crate::domain::{Error, USER_NOT_FOUND_MESSAGE, UserId, UserRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::{ErrorBody, StoreErrorBody, ValidationErrorBody};
use crate::inbound::http::payload::UserBody;
use crate::inbound::http::schemas::{UserRecordSchema, UserSchema};
use crate::inbound::http::state::HttpState;

/// Request body for the create and update routes, sent as JSON or as an
/// urlencoded form.
///
/// Scalar values are read as text. Create forwards any other key to the store
/// as a column; update ignores them.
#[derive(Debug, Default, ToSchema)]
pub struct UserPayload {
    #[schema(example = "a@b.com")]
    pub email: Option<String>,
    #[schema(example = "longenough")]
    pub password: Option<String>,
    #[schema(example = "Al")]
    pub name: Option<String>,
}

/// Parse the `:id` path segment; anything but an integer addresses no user.
fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.parse::<i64>()
        .map(UserId::new)
        .map_err(|_| Error::not_found(USER_NOT_FOUND_MESSAGE))
}

/// Absolute URL of the request's own path, as seen by the client.
fn request_url(req: &HttpRequest, path: &str) -> String {
    let info = req.connection_info();
    format!("{}://{}{}", info.scheme(), info.host(), path)
}

/// List every stored user, passwords included.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use users_api::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Every stored user", body = [UserRecordSchema]),
        (status = 500, description = "Store failure", body = StoreErrorBody)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserRecord>>> {
    let users = state.users_query.list_users().await?;
    Ok(web::Json(users))
}

/// Create a user and point `Location` at it.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body(content(
        (UserPayload = "application/json"),
        (UserPayload = "application/x-www-form-urlencoded")
    )),
    responses(
        (status = 201, description = "User created", body = UserSchema,
            headers(("Location" = String, description = "URL of the new user"))),
        (status = 400, description = "Undecodable JSON or form body", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ValidationErrorBody),
        (status = 500, description = "Store failure, including unknown columns", body = StoreErrorBody)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: UserBody,
) -> ApiResult<HttpResponse> {
    let user = state
        .users_command
        .create_user(body.into_inner())
        .await?;
    let collection = req.path().trim_end_matches('/');
    let location = request_url(&req, &format!("{collection}/{}", user.id));
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(user))
}

/// Apply the fields present in the body to an existing user.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body(content(
        (UserPayload = "application/json"),
        (UserPayload = "application/x-www-form-urlencoded")
    )),
    responses(
        (status = 200, description = "User updated", body = UserSchema,
            headers(("Location" = String, description = "URL of the request"))),
        (status = 400, description = "Undecodable JSON or form body", body = ErrorBody),
        (status = 404, description = "No such user", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ValidationErrorBody),
        (status = 500, description = "Store failure", body = StoreErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: UserBody,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner())?;
    let user = state
        .users_command
        .update_user(id, body.into_inner())
        .await?;
    let own_path = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
    let location = request_url(&req, &own_path);
    Ok(HttpResponse::Ok()
        .insert_header((header::LOCATION, location))
        .json(user))
}
