use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::UserData;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::Violations;
use crate::inbound::http::router::AppState;

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;
    let Json(body) = payload?;

    state
        .user_service
        .update_user(&user_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| {
            ApiSuccess::new(StatusCode::OK, user.into()).with_message("user successfully updated")
        })
}

/// Email and username are both required; password and role are not updatable here.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    email: String,
    username: String,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, ApiError> {
        let mut violations = Violations::default();
        let email = violations.check("email", EmailAddress::new(self.email));
        let username = violations.check("username", Username::new(self.username));

        match (email, username) {
            (Some(email), Some(username)) => Ok(UpdateUserCommand { email, username }),
            _ => Err(violations.into_error()),
        }
    }
}
