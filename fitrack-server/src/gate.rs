//! Authorization gate for protected routes

use fitrack_core::auth::{AuthError, SessionAuthorizer};
use fitrack_core::UserId;
use hyper::header::{HeaderMap, AUTHORIZATION};
use tracing::debug;

use crate::error::ApiError;

/// Extract the token from `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

/// Resolve the authenticated user for a request
pub fn authorize(headers: &HeaderMap, authorizer: &SessionAuthorizer) -> Result<UserId, ApiError> {
    let subject = authorizer.validate(bearer_token(headers))?;
    UserId::parse(&subject).map_err(|e| {
        debug!("token subject is not a user id: {}", e);
        ApiError::from(AuthError::Malformed)
    })
}
