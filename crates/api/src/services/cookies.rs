//! Session cookie helper.
//!
//! Builds, clears, and reads the httpOnly session cookie that carries the
//! signed session token for browser clients.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};

use crate::config::CookieConfig;

/// Helper for managing the httpOnly session cookie.
#[derive(Debug, Clone)]
pub struct CookieHelper {
    config: CookieConfig,
    /// Session lifetime in seconds, used as the cookie Max-Age.
    session_ttl_secs: i64,
}

impl CookieHelper {
    /// Create a new cookie helper with configuration.
    pub fn new(config: CookieConfig, session_ttl_secs: i64) -> Self {
        Self {
            config,
            session_ttl_secs,
        }
    }

    /// Build a Set-Cookie header value carrying the session token.
    pub fn build_session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}",
            self.config.name, token, self.config.path, self.session_ttl_secs
        );
        self.push_attributes(&mut cookie);
        cookie
    }

    /// Build a Set-Cookie header value that clears the session cookie.
    pub fn build_clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.config.name, self.config.path
        );
        self.push_attributes(&mut cookie);
        cookie
    }

    /// Add the session cookie to a response HeaderMap.
    pub fn add_session_cookie(&self, headers: &mut HeaderMap, token: &str) {
        if let Ok(value) = HeaderValue::from_str(&self.build_session_cookie(token)) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Add a clearing cookie to a response HeaderMap (logout).
    pub fn add_clear_cookie(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.build_clear_cookie()) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Extract the session token from request headers, if present.
    pub fn extract_session_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get(axum::http::header::COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|cookie_header| {
                cookie_header
                    .split(';')
                    .map(|s| s.trim())
                    .find_map(|cookie| {
                        let (name, value) = cookie.split_once('=')?;
                        (name == self.config.name).then_some(value)
                    })
            })
    }

    fn push_attributes(&self, cookie: &mut String) {
        cookie.push_str("; HttpOnly");

        if self.config.secure {
            cookie.push_str("; Secure");
        }

        cookie.push_str(&format!("; SameSite={}", self.config.same_site));

        if !self.config.domain.is_empty() {
            cookie.push_str(&format!("; Domain={}", self.config.domain));
        }
    }
}
