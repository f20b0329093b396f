//! Security headers middleware.
//!
//! The list screen only loads its own stylesheet and the htmx script, so the
//! policy stays close to fully locked down.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

/// Origin the htmx script is served from. Must match `templates/base.html`.
macro_rules! htmx_origin {
    () => {
        "https://unpkg.com"
    };
}

const CONTENT_SECURITY_POLICY_VALUE: &str = concat!(
    "default-src 'none'; ",
    "script-src 'self' ",
    htmx_origin!(),
    "; ",
    "style-src 'self'; ",
    "img-src 'self'; ",
    "connect-src 'self'; ",
    "object-src 'none'; ",
    "base-uri 'self'; ",
    "form-action 'self'; ",
    "frame-ancestors 'none'"
);

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: no-referrer`
/// - `Content-Security-Policy` allowing same-origin assets plus htmx
/// - `Permissions-Policy` denying device features
/// - `Cache-Control: no-store` so a reload always shows the stored list
/// - `Cross-Origin-Opener-Policy: same-origin`
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), geolocation=(), microphone=(), payment=(), usb=(), interest-cohort=()",
        ),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_allows_htmx_origin() {
        assert!(
            CONTENT_SECURITY_POLICY_VALUE.contains(concat!("script-src 'self' ", htmx_origin!(), ";"))
        );
        assert!(CONTENT_SECURITY_POLICY_VALUE.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn test_base_template_loads_htmx_from_allowed_origin() {
        let base = include_str!("../../templates/base.html");
        assert!(base.contains(concat!("<script src=\"", htmx_origin!(), "/")));
    }
}
