use axum::http::{HeaderMap, header};
use subtle::ConstantTimeEq;

/// Verify the request carries a valid bearer token.
/// Returns true if no token is required (loopback) or if the token matches.
pub fn verify_bearer(headers: &HeaderMap, expected: &Option<String>) -> bool {
    let expected = match expected {
        Some(t) => t,
        None => return true, // No auth required (loopback mode)
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) => constant_time_eq(token.as_bytes(), expected.as_bytes()),
        None => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
