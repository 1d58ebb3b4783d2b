use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;

use super::handlers::auth::cookies::ACCESS_TOKEN_COOKIE;
use super::handlers::ApiError;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::UNAUTHORIZED;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

/// Principal inserted into request extensions by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: Username,
    pub role: Role,
}

/// Resolve the access token to a live user and attach it as [`CurrentUser`].
///
/// The `access_token` cookie wins over an `Authorization: Bearer` header.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = access_token(&jar, &req)
        .ok_or_else(|| ApiError::Unauthorized(UNAUTHORIZED.to_string()))?;

    let user = state
        .auth_service
        .authenticate(&token)
        .await
        .map_err(|e| match e {
            AuthError::Internal(_) => ApiError::from(e),
            _ => ApiError::Unauthorized(UNAUTHORIZED.to_string()),
        })?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        role: user.role,
    });

    Ok(next.run(req).await)
}

/// Reject anyone but administrators. Must run inside [`authenticate`].
pub async fn require_admin(
    Extension(current): Extension<CurrentUser>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if current.role != Role::Admin {
        tracing::warn!(user_id = %current.id, "Non-admin denied access to admin route");
        return Err(ApiError::Forbidden("forbidden".to_string()));
    }

    Ok(next.run(req).await)
}

fn access_token(jar: &CookieJar, req: &Request) -> Option<String> {
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
