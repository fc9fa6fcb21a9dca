use axum::http::HeaderMap;

/// Pull the bearer token out of the `Authorization` header.
///
/// The token is opaque to the relay: it is never validated here, only
/// forwarded. Absence is the caller's signal to reject with 401.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}
