//! CORS configuration.
//!
//! The allow-list combines exact origins with hosting-provider suffixes, so
//! preview deployments (`my-branch-abc123.vercel.app`) are admitted without
//! enumerating each one in config.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::SecurityConfig;

/// Decides whether an Origin header value is allowed.
///
/// An origin is allowed when it matches one of the exact `origins`, or when
/// its host ends with one of the `suffixes`. Suffixes must start with a dot
/// (`.vercel.app`), which keeps `evil-vercel.app` out while admitting every
/// genuine subdomain.
pub fn origin_allowed(origin: &str, origins: &[String], suffixes: &[String]) -> bool {
    if origins.iter().any(|o| o == origin) {
        return true;
    }

    let host = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
        .unwrap_or(origin);
    let host = host.split(':').next().unwrap_or(host);

    suffixes
        .iter()
        .any(|s| s.starts_with('.') && host.ends_with(s.as_str()))
}

/// Builds the CORS layer from security configuration.
///
/// Credentials are always allowed since the session rides in a cookie, which
/// rules out the wildcard origin; requests without an Origin header are not
/// gated by this layer.
pub fn build_cors_layer(config: &SecurityConfig) -> CorsLayer {
    let origins = config.cors_origins.clone();
    let suffixes = config.cors_origin_suffixes.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| origin_allowed(o, &origins, &suffixes))
                .unwrap_or(false)
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists() -> (Vec<String>, Vec<String>) {
        (
            vec!["https://eventhub.app".to_string()],
            vec![".vercel.app".to_string()],
        )
    }

    #[test]
    fn test_exact_origin_allowed() {
        let (origins, suffixes) = lists();
        assert!(origin_allowed("https://eventhub.app", &origins, &suffixes));
    }

    #[test]
    fn test_exact_origin_is_not_prefix_matched() {
        let (origins, suffixes) = lists();
        assert!(!origin_allowed(
            "https://eventhub.app.evil.com",
            &origins,
            &suffixes
        ));
    }

    #[test]
    fn test_suffix_allows_any_subdomain() {
        let (origins, suffixes) = lists();
        assert!(origin_allowed(
            "https://eventhub-git-main-team.vercel.app",
            &origins,
            &suffixes
        ));
        assert!(origin_allowed(
            "https://deep.nested.vercel.app",
            &origins,
            &suffixes
        ));
    }

    #[test]
    fn test_suffix_requires_subdomain_boundary() {
        let (origins, suffixes) = lists();
        assert!(!origin_allowed(
            "https://evil-vercel.app",
            &origins,
            &suffixes
        ));
    }

    #[test]
    fn test_suffix_ignores_port() {
        let (origins, suffixes) = lists();
        assert!(origin_allowed(
            "http://preview.vercel.app:3000",
            &origins,
            &suffixes
        ));
    }

    #[test]
    fn test_unknown_origin_rejected() {
        let (origins, suffixes) = lists();
        assert!(!origin_allowed("https://example.com", &origins, &suffixes));
    }

    #[test]
    fn test_suffix_without_leading_dot_is_inert() {
        let origins = vec![];
        let suffixes = vec!["vercel.app".to_string()];
        assert!(!origin_allowed("https://a.vercel.app", &origins, &suffixes));
    }

    #[test]
    fn test_empty_lists_reject_everything() {
        assert!(!origin_allowed("https://eventhub.app", &[], &[]));
    }
}
