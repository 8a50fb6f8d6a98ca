//! Request body decoding for the user routes.
//!
//! Bodies arrive as JSON or as urlencoded forms. Every submitted value is
//! read as text: numbers and booleans by their literal form, arrays by their
//! first element, `null` and nested objects as an empty string. A body in any
//! other content type, or no body at all, submits no fields.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use serde_json::Value;

use crate::domain::{Error, ExtraColumn, UserFields};

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// User fields decoded from the request body.
///
/// # Examples
/// ```
/// use actix_web::{HttpResponse, post};
/// use users_api::inbound::http::payload::UserBody;
///
/// #[post("/users")]
/// async fn create(body: UserBody) -> HttpResponse {
///     let fields = body.into_inner();
///     HttpResponse::Ok().body(fields.name.unwrap_or_default())
/// }
/// ```
#[derive(Debug, Default)]
pub struct UserBody(UserFields);

impl UserBody {
    /// The decoded fields.
    pub fn into_inner(self) -> UserFields {
        self.0
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.first().map(scalar_text).unwrap_or_default(),
        other => scalar_text(other),
    }
}

/// Sort submitted pairs into the known fields and extra columns. The first
/// occurrence of a key wins.
fn collect_fields<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> UserFields {
    let mut fields = UserFields::default();
    for (key, value) in pairs {
        let slot = match key {
            "email" => &mut fields.email,
            "password" => &mut fields.password,
            "name" => &mut fields.name,
            _ => {
                if !fields.extra.iter().any(|column| column.name == key) {
                    fields.extra.push(ExtraColumn::new(key, value));
                }
                continue;
            }
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }
    fields
}

/// Decode a JSON body. Objects carry fields, arrays carry none, and any
/// other top-level value is rejected.
fn fields_from_json(bytes: &[u8]) -> Result<UserFields, Error> {
    if bytes.is_empty() {
        return Ok(UserFields::default());
    }
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| Error::invalid_request(format!("invalid JSON body: {err}")))?;
    match value {
        Value::Object(map) => Ok(collect_fields(
            map.iter().map(|(key, value)| (key.as_str(), value_text(value))),
        )),
        Value::Array(_) => Ok(UserFields::default()),
        _ => Err(Error::invalid_request(
            "JSON body must be an object or an array",
        )),
    }
}

fn fields_from_form(pairs: &[(String, String)]) -> UserFields {
    collect_fields(
        pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.clone())),
    )
}

impl FromRequest for UserBody {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let content_type = req.content_type().to_ascii_lowercase();
        if content_type == JSON_CONTENT_TYPE {
            let bytes = web::Bytes::from_request(req, payload);
            Box::pin(async move {
                let bytes = bytes.await?;
                Ok(Self(fields_from_json(&bytes)?))
            })
        } else if content_type == FORM_CONTENT_TYPE {
            let form = web::Form::<Vec<(String, String)>>::from_request(req, payload);
            Box::pin(async move {
                let form = form
                    .await
                    .map_err(|err| Error::invalid_request(err.to_string()))?;
                Ok(Self(fields_from_form(&form)))
            })
        } else {
            Box::pin(async { Ok(Self::default()) })
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    fn json_scalars_are_read_as_text() {
        let fields = fields_from_json(br#"{"email": true, "password": 12345678, "name": null}"#)
            .expect("object body");

        assert_eq!(fields.email.as_deref(), Some("true"));
        assert_eq!(fields.password.as_deref(), Some("12345678"));
        assert_eq!(fields.name.as_deref(), Some(""));
    }

    #[rstest]
    fn json_arrays_use_their_first_element() {
        let body = br#"{"name": ["Al", "Bo"], "email": [], "password": {"a": 1}}"#;

        let fields = fields_from_json(body).expect("object body");

        assert_eq!(fields.name.as_deref(), Some("Al"));
        assert_eq!(fields.email.as_deref(), Some(""));
        assert_eq!(fields.password.as_deref(), Some(""));
    }

    #[rstest]
    fn unknown_keys_become_extra_columns() {
        let fields = fields_from_json(br#"{"name": "Al", "role": "admin", "age": 7}"#)
            .expect("object body");

        assert_eq!(
            fields.extra,
            vec![ExtraColumn::new("age", "7"), ExtraColumn::new("role", "admin")]
        );
    }

    #[rstest]
    #[case::empty(b"")]
    #[case::array(b"[1, 2, 3]")]
    fn bodies_without_an_object_submit_nothing(#[case] body: &[u8]) {
        assert_eq!(fields_from_json(body), Ok(UserFields::default()));
    }

    #[rstest]
    #[case::malformed(br#"{"email": "#)]
    #[case::scalar(b"\"a@b.com\"")]
    fn undecodable_json_is_an_invalid_request(#[case] body: &[u8]) {
        let err = fields_from_json(body).expect_err("undecodable body");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn repeated_form_keys_keep_the_first_value() {
        let pairs = vec![
            ("name".to_owned(), "Al".to_owned()),
            ("name".to_owned(), "Bo".to_owned()),
            ("role".to_owned(), "admin".to_owned()),
            ("role".to_owned(), "root".to_owned()),
        ];

        let fields = fields_from_form(&pairs);

        assert_eq!(fields.name.as_deref(), Some("Al"));
        assert_eq!(fields.extra, vec![ExtraColumn::new("role", "admin")]);
    }

    #[actix_web::test]
    async fn urlencoded_bodies_are_decoded() {
        let (req, mut payload) = TestRequest::post()
            .insert_header(("content-type", FORM_CONTENT_TYPE))
            .set_payload("email=a%40b.com&password=longenough&name=Al")
            .to_http_parts();

        let fields = UserBody::from_request(&req, &mut payload)
            .await
            .expect("form body")
            .into_inner();

        assert_eq!(fields.email.as_deref(), Some("a@b.com"));
        assert_eq!(fields.password.as_deref(), Some("longenough"));
        assert_eq!(fields.name.as_deref(), Some("Al"));
    }

    #[actix_web::test]
    async fn json_content_type_parameters_are_ignored() {
        let (req, mut payload) = TestRequest::post()
            .insert_header(("content-type", "application/json; charset=utf-8"))
            .set_payload(r#"{"name": "Al"}"#)
            .to_http_parts();

        let fields = UserBody::from_request(&req, &mut payload)
            .await
            .expect("json body")
            .into_inner();

        assert_eq!(fields.name.as_deref(), Some("Al"));
    }

    #[rstest]
    #[case::missing(None)]
    #[case::plain_text(Some("text/plain"))]
    #[actix_web::test]
    async fn other_bodies_submit_nothing(#[case] content_type: Option<&'static str>) {
        let mut request = TestRequest::post().set_payload(r#"{"name": "Al"}"#);
        if let Some(content_type) = content_type {
            request = request.insert_header(("content-type", content_type));
        }
        let (req, mut payload) = request.to_http_parts();

        let body = UserBody::from_request(&req, &mut payload)
            .await
            .expect("ignored body");

        assert_eq!(body.into_inner(), UserFields::default());
    }
}
