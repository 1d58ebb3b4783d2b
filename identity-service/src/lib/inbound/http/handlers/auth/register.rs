use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::handlers::parse_new_user;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<()>, ApiError> {
    let Json(body) = payload?;
    let command = parse_new_user(
        body.email,
        body.username,
        body.password,
        body.password_confirmation,
    )?;

    state.auth_service.register(command).await?;

    Ok(ApiSuccess::message(
        StatusCode::CREATED,
        "user successfully registered",
    ))
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequestBody {
    email: String,
    username: String,
    password: String,
    password_confirmation: String,
}
