use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::cookies::REFRESH_TOKEN_COOKIE;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Rotate the refresh token carried in the `refresh_token` cookie.
///
/// Needs no access token, so a session survives access-token expiry.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<()>), ApiError> {
    let token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::from(AuthError::invalid_refresh_token()))?;

    let credentials = state.auth_service.refresh(&token).await?;

    Ok((
        state.cookies.store(jar, &credentials),
        ApiSuccess::message(StatusCode::OK, "token successfully refreshed"),
    ))
}
