use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::Violations;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<(CookieJar, ApiSuccess<Credentials>), ApiError> {
    let Json(body) = payload?;
    let command = body.try_into_command()?;

    let credentials = state.auth_service.login(command).await?;

    Ok((
        state.cookies.store(jar, &credentials),
        ApiSuccess::new(StatusCode::OK, credentials).with_message("user successfully logged in"),
    ))
}

/// Only presence is checked; a malformed username is just a failed login.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}

impl LoginRequestBody {
    fn try_into_command(self) -> Result<LoginCommand, ApiError> {
        let mut violations = Violations::default();
        violations.require("username", &self.username);
        violations.require("password", &self.password);

        if !violations.is_empty() {
            return Err(violations.into_error());
        }

        Ok(LoginCommand {
            username: self.username,
            password: self.password,
        })
    }
}
