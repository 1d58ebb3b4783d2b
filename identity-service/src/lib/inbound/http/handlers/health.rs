use axum::http::StatusCode;

use super::ApiSuccess;

/// Liveness only; does not touch the database.
pub async fn health() -> ApiSuccess<()> {
    ApiSuccess::message(StatusCode::OK, "ok")
}
