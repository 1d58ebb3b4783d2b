use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::cookies::REFRESH_TOKEN_COOKIE;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Revoke the presented refresh token, if any, and clear both cookies.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, ApiSuccess<()>) {
    let token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty());

    if let Some(token) = token {
        if let Err(e) = state.auth_service.logout(&token).await {
            tracing::warn!(error = %e, "Failed to revoke refresh token on logout");
        }
    }

    (
        state.cookies.clear(jar),
        ApiSuccess::message(StatusCode::OK, "user successfully logged out"),
    )
}
