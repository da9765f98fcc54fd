//! Refresh token cookie

use std::time::Duration;

use super::server::API_PREFIX;

pub const REFRESH_COOKIE: &str = "refreshToken";

/// The refresh cookie is only ever sent to the refresh endpoint
pub fn refresh_cookie_path() -> String {
    format!("{}/refresh-token", API_PREFIX)
}

/// `Set-Cookie` value carrying a refresh token
pub fn refresh_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path={}; Max-Age={}",
        REFRESH_COOKIE,
        token,
        refresh_cookie_path(),
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the refresh cookie
pub fn clear_refresh_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; HttpOnly; SameSite=Strict; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        REFRESH_COOKIE,
        refresh_cookie_path()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let cookie = refresh_cookie("abc", Duration::from_secs(604_800), false);
        assert!(cookie.starts_with("refreshToken=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/api/v1/refresh-token"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));

        assert!(refresh_cookie("abc", Duration::from_secs(1), true).ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_refresh_cookie(false);
        assert!(cookie.starts_with("refreshToken=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Path=/api/v1/refresh-token"));
    }
}
