use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;
use time::Duration;

use crate::domain::auth::models::Credentials;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Attributes of the two HttpOnly auth cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
}

impl CookieSettings {
    pub fn new(secure: bool, access_ttl: chrono::Duration, refresh_ttl: chrono::Duration) -> Self {
        Self {
            secure,
            access_max_age: Duration::seconds(access_ttl.num_seconds()),
            refresh_max_age: Duration::seconds(refresh_ttl.num_seconds()),
        }
    }

    fn cookie(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }

    /// Set both token cookies from a freshly issued pair.
    pub fn store(&self, jar: CookieJar, credentials: &Credentials) -> CookieJar {
        jar.add(self.cookie(
            ACCESS_TOKEN_COOKIE,
            credentials.access_token.clone(),
            self.access_max_age,
        ))
        .add(self.cookie(
            REFRESH_TOKEN_COOKIE,
            credentials.refresh_token.clone(),
            self.refresh_max_age,
        ))
    }

    /// Expire both token cookies, whether or not the client sent them.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.cookie(ACCESS_TOKEN_COOKIE, String::new(), Duration::ZERO))
            .add(self.cookie(REFRESH_TOKEN_COOKIE, String::new(), Duration::ZERO))
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self::new(
            false,
            chrono::Duration::minutes(15),
            chrono::Duration::days(7),
        )
    }
}
