use std::fmt::Display;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::auth::errors::AuthError;
use crate::domain::errors::FieldError;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Pagination;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;

pub mod auth;
pub mod health;
pub mod users;

const INTERNAL_SERVER_ERROR: &str = "internal server error";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::with_data(data)))
    }

    pub fn paginated(status: StatusCode, data: T, pagination: Pagination) -> Self {
        let mut body = ApiResponseBody::with_data(data);
        body.pagination = Some(pagination.into());
        ApiSuccess(status, Json(body))
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.1 .0.message = Some(message.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.0
    }

    pub fn body(&self) -> &ApiResponseBody<T> {
        &self.1 .0
    }
}

impl ApiSuccess<()> {
    /// A body carrying only `success` and `message`.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        ApiSuccess(
            status,
            Json(ApiResponseBody {
                success: true,
                message: Some(message.into()),
                data: None,
                error: None,
                pagination: None,
            }),
        )
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The payload is logged, never sent.
    InternalServerError(String),
    UnprocessableEntity(Vec<FieldError>),
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!(detail = %detail, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorData::Message(INTERNAL_SERVER_ERROR.to_string()),
                )
            }
            ApiError::UnprocessableEntity(fields) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ApiErrorData::Fields(fields))
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiErrorData::Message(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiErrorData::Message(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ApiErrorData::Message(msg)),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiErrorData::Message(msg)),
        };

        (status, Json(ApiResponseBody::<()>::new_error(error))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidUserId(_) => ApiError::BadRequest(err.to_string()),
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::Validation(fields) => ApiError::UnprocessableEntity(fields),
            UserError::Internal(detail) => ApiError::InternalServerError(detail),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            AuthError::Validation(fields) => ApiError::UnprocessableEntity(fields),
            AuthError::Internal(detail) => ApiError::InternalServerError(detail),
        }
    }
}

/// The `{ success, message?, data?, error?, pagination? }` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationData>,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn with_data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
            pagination: None,
        }
    }
}

impl ApiResponseBody<()> {
    pub fn new_error(error: ApiErrorData) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error),
            pagination: None,
        }
    }
}

/// Either a single message or the per-field validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ApiErrorData {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationData {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<Pagination> for PaginationData {
    fn from(p: Pagination) -> Self {
        Self {
            page: p.page,
            limit: p.limit,
            total_items: p.total_items,
            total_pages: p.total_pages,
            has_next: p.has_next,
            has_prev: p.has_prev,
        }
    }
}

/// Collects per-field failures while a request body is parsed.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldError>);

impl Violations {
    /// Record the error of `result` against `field`, yielding the value on success.
    pub fn check<T, E: Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(field, e.to_string());
                None
            }
        }
    }

    pub fn push(&mut self, field: &str, error: impl Into<String>) {
        self.0.push(FieldError::new(field, error));
    }

    pub fn require(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.push(field, format!("{} is required", field));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_error(self) -> ApiError {
        ApiError::UnprocessableEntity(self.0)
    }
}

/// Validate the fields shared by registration and administrative creation.
pub fn parse_new_user(
    email: String,
    username: String,
    password: String,
    password_confirmation: String,
) -> Result<CreateUserCommand, ApiError> {
    let mut violations = Violations::default();

    let email = violations.check("email", EmailAddress::new(email));
    let username = violations.check("username", Username::new(username));

    if password_confirmation.is_empty() {
        violations.push("password_confirmation", "password_confirmation is required");
    } else if password_confirmation != password {
        violations.push(
            "password_confirmation",
            "password_confirmation must be equal to password",
        );
    }
    let password = violations.check("password", Password::new(password));

    match (email, username, password) {
        (Some(email), Some(username), Some(password)) if violations.is_empty() => {
            Ok(CreateUserCommand::new(email, username, password))
        }
        _ => Err(violations.into_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::errors::UserIdError;

    #[test]
    fn test_envelope_omits_absent_members() {
        let body = ApiSuccess::message(StatusCode::CREATED, "user successfully registered");

        let json = serde_json::to_value(body.body()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "message": "user successfully registered"
            })
        );
    }

    #[test]
    fn test_validation_error_serializes_field_list() {
        let body = ApiResponseBody::<()>::new_error(ApiErrorData::Fields(vec![
            FieldError::already_exists("email"),
        ]));

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "error": [{ "field": "email", "error": "email already exists" }]
            })
        );
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let response =
            ApiError::InternalServerError("connection refused".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_malformed_user_id_maps_to_bad_request() {
        let err = UserError::from(UserIdError::InvalidFormat("not-a-uuid".to_string()));

        assert!(matches!(ApiError::from(err), ApiError::BadRequest(_)));
    }

    #[test]
    fn test_parse_new_user_collects_every_field() {
        let result = parse_new_user(
            "nope".to_string(),
            "a".to_string(),
            "short".to_string(),
            "different".to_string(),
        );

        match result {
            Err(ApiError::UnprocessableEntity(fields)) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(
                    names,
                    vec!["email", "username", "password_confirmation", "password"]
                );
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_new_user_rejects_mismatched_confirmation() {
        let result = parse_new_user(
            "alice@example.com".to_string(),
            "alice".to_string(),
            "password123".to_string(),
            "password124".to_string(),
        );

        assert_eq!(
            result.err(),
            Some(ApiError::UnprocessableEntity(vec![FieldError::new(
                "password_confirmation",
                "password_confirmation must be equal to password"
            )]))
        );
    }
}
