//! Refresh token cookie handling

use crate::error::AppError;
use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

/// `Set-Cookie` value for a freshly issued refresh token.
/// `Secure` is only set in production so local HTTP development keeps working.
pub fn refresh_cookie(token: &str, max_age_secs: u64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        REFRESH_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("Invalid cookie value: {}", e)))
}

/// `Set-Cookie` value that makes the client drop the refresh token
pub fn clear_refresh_cookie() -> HeaderValue {
    HeaderValue::from_static("refreshToken=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0; Secure")
}

/// Read a cookie by name from every `Cookie` header on the request
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let value = refresh_cookie("abc.def.ghi", 604800, false).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("refreshToken=abc.def.ghi;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Strict"));
        assert!(value.contains("Max-Age=604800"));
        assert!(!value.contains("Secure"));

        let secure = refresh_cookie("abc", 604800, true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let value = clear_refresh_cookie();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("refreshToken=;"));
        assert!(value.contains("Max-Age=0"));
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "theme=dark; refreshToken=tok.en.value; lang=en".parse().unwrap());
        assert_eq!(read_cookie(&headers, REFRESH_COOKIE).as_deref(), Some("tok.en.value"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_read_cookie_empty_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "refreshToken=".parse().unwrap());
        assert_eq!(read_cookie(&headers, REFRESH_COOKIE), None);
    }
}
