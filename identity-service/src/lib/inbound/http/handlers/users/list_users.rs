use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::UserData;
use crate::domain::user::models::ListUsersQuery;
use crate::domain::user::models::SortDirection;
use crate::domain::user::models::UserOrderBy;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::Violations;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> Result<ApiSuccess<Vec<UserData>>, ApiError> {
    let page = state
        .user_service
        .list_users(params.try_into_query()?)
        .await?;

    let users = page.items.iter().map(UserData::from).collect();
    Ok(ApiSuccess::paginated(StatusCode::OK, users, page.pagination))
}

/// Raw query string. Kept as text so malformed numbers surface as field
/// errors rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListUsersParams {
    page: Option<String>,
    limit: Option<String>,
    search: Option<String>,
    order_by: Option<String>,
    order_type: Option<String>,
}

fn parse_bounded(raw: &str, min: u32, max: u32) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n < min => Err(format!("must be at least {}", min)),
        Ok(n) if n > max => Err(format!("must be at most {}", max)),
        Ok(n) => Ok(n),
        Err(_) => Err("must be a number".to_string()),
    }
}

impl ListUsersParams {
    fn try_into_query(self) -> Result<ListUsersQuery, ApiError> {
        let mut violations = Violations::default();
        let mut query = ListUsersQuery::default();

        if let Some(raw) = self.page.filter(|p| !p.is_empty()) {
            if let Some(page) = violations.check(
                "page",
                parse_bounded(&raw, 1, u32::MAX).map_err(|e| format!("page {}", e)),
            ) {
                query.page = page;
            }
        }

        if let Some(raw) = self.limit.filter(|l| !l.is_empty()) {
            if let Some(limit) = violations.check(
                "limit",
                parse_bounded(&raw, 1, ListUsersQuery::MAX_LIMIT)
                    .map_err(|e| format!("limit {}", e)),
            ) {
                query.limit = limit;
            }
        }

        if let Some(search) = self.search.filter(|s| !s.is_empty()) {
            if search.chars().count() > ListUsersQuery::MAX_SEARCH_LENGTH {
                violations.push(
                    "search",
                    format!(
                        "search must be at most {} characters",
                        ListUsersQuery::MAX_SEARCH_LENGTH
                    ),
                );
            } else {
                query.search = Some(search);
            }
        }

        if let Some(raw) = self.order_by.filter(|o| !o.is_empty()) {
            if let Some(order_by) = violations.check("order_by", raw.parse::<UserOrderBy>()) {
                query.order_by = order_by;
            }
        }

        if let Some(raw) = self.order_type.filter(|o| !o.is_empty()) {
            if let Some(direction) = violations.check("order_type", raw.parse::<SortDirection>()) {
                query.direction = direction;
            }
        }

        if violations.is_empty() {
            Ok(query)
        } else {
            Err(violations.into_error())
        }
    }
}
