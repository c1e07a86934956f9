//! `Authorization: Bearer <token>` header parsing.
use axum::http::{HeaderMap, header};

use crate::services::auth::error::AuthError;

/// Returns the bearer token carried by the request headers.
///
/// The scheme is matched case-insensitively and the header must split into
/// exactly two whitespace-delimited parts.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("Authorization header must be bearer token."))?;

    let mut parts = value.split_whitespace();

    // Present but blank is malformed; only an absent header is "missing".
    let scheme = parts.next().ok_or(AuthError::MalformedHeader(
        "Authorization header must be bearer token.",
    ))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader(
            "Authorization header must start with \"Bearer\".",
        ));
    }

    let token = parts
        .next()
        .ok_or(AuthError::MalformedHeader("Token not found."))?;

    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader(
            "Authorization header must be bearer token.",
        ));
    }

    Ok(token)
}
