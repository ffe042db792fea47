//! Client-facing errors
//!
//! Every failure is reduced to a status and a fixed message before it leaves the
//! server. Internal error text is logged, never returned.

use bytes::Bytes;
use fitrack_core::{AuthError, FitrackError, KdfError};
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde_json::json;
use std::borrow::Cow;
use thiserror::Error;
use tracing::{debug, error};

use crate::server::json_response;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: Cow<'static, str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn payload_too_large() -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        json_response(self.status, &json!({ "message": self.message }))
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        debug!(reason = e.reason(), "authorization rejected");
        ApiError::unauthorized()
    }
}

impl From<KdfError> for ApiError {
    fn from(e: KdfError) -> Self {
        error!("credential derivation failed: {}", e);
        ApiError::internal()
    }
}

impl From<FitrackError> for ApiError {
    fn from(e: FitrackError) -> Self {
        match e {
            FitrackError::Auth(e) => e.into(),
            FitrackError::Kdf(e) => e.into(),
            FitrackError::InvalidEmail(_) => ApiError::bad_request("Invalid email"),
            FitrackError::InvalidField(detail) => {
                debug!("rejected field: {}", detail);
                ApiError::bad_request("Invalid profile fields")
            }
            FitrackError::UserExists { .. } => ApiError::bad_request("User already exists"),
            FitrackError::ProfileExists { .. } => {
                ApiError::bad_request("Profile already exists")
            }
            FitrackError::ProfileNotFound { .. } => {
                ApiError::bad_request("Profile not found. Please create a profile first.")
            }
            other => {
                error!("request failed: {}", other);
                ApiError::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_auth_error_is_unauthorized() {
        for e in [AuthError::Missing, AuthError::Malformed, AuthError::Expired] {
            let api: ApiError = FitrackError::Auth(e).into();
            assert_eq!(api, ApiError::unauthorized());
        }
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let api: ApiError = FitrackError::Storage("disk on fire at /var/lib".to_string()).into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("disk"));

        let api: ApiError = KdfError::Rng("entropy unavailable".to_string()).into();
        assert_eq!(api, ApiError::internal());
    }

    #[test]
    fn test_conflicts_are_bad_requests() {
        let api: ApiError = FitrackError::UserExists {
            email: "a@b.c".to_string(),
        }
        .into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "User already exists");
    }
}
