//! Stateless session tokens
//!
//! Tokens are compact HS256 JWTs carrying `sub`, `iss`, `iat`, `nbf` and `exp`.
//! The MAC key is derived from the configured signing secret with HKDF-SHA256,
//! so the secret itself never keys the MAC. Nothing is persisted server-side: a token is
//! valid exactly when its signature verifies and the clock is inside its window.

use hkdf::Hkdf;
use jwt_simple::prelude::{
    Claims, Duration as JwtDuration, HS256Key, MACLike, NoCustomClaims, VerificationOptions,
};
use sha2::Sha256;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

use super::clock::{unix_seconds, Clock, SystemClock};
use crate::{AuthConfig, FitrackError, Result};

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token TTL
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

const KEY_DERIVATION_INFO: &[u8] = b"fitrack session token signing key v1";

// jwt-simple's built-in window checks read the wall clock. They are widened so the
// window is enforced exactly against the injected clock in `validate`.
const LIBRARY_TIME_TOLERANCE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Why a request failed authorization.
///
/// All variants surface to clients as the same "unauthorized" response; the
/// distinction exists for logs only.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("no session token presented")]
    Missing,

    #[error("session token is malformed or its signature does not verify")]
    Malformed,

    #[error("session token has expired")]
    Expired,
}

impl AuthError {
    /// Short reason tag for structured logs
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Missing => "missing",
            AuthError::Malformed => "malformed",
            AuthError::Expired => "expired",
        }
    }
}

/// A freshly signed token and the window it is valid for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub subject: String,
    pub issued_at: SystemTime,
    pub expires_at: SystemTime,
}

/// Issues and validates session tokens
#[derive(Clone)]
pub struct SessionAuthorizer {
    key: HS256Key,
    issuer: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionAuthorizer {
    /// Create an authorizer on the system clock
    pub fn new(config: &AuthConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an authorizer reading time from `clock`
    pub fn with_clock(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let secret = config.signing_secret.as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(FitrackError::Config(format!(
                "signing secret too short: got {} bytes, need at least {}",
                secret.len(),
                MIN_SECRET_LEN
            )));
        }
        if config.token_ttl.as_secs() == 0 {
            return Err(FitrackError::Config(
                "token TTL must be at least one second".to_string(),
            ));
        }
        if config.token_ttl > MAX_TOKEN_TTL {
            return Err(FitrackError::Config(format!(
                "token TTL of {}s exceeds the maximum of {}s",
                config.token_ttl.as_secs(),
                MAX_TOKEN_TTL.as_secs()
            )));
        }

        let mut key_bytes = [0u8; 32];
        Hkdf::<Sha256>::new(None, secret)
            .expand(KEY_DERIVATION_INFO, &mut key_bytes)
            .map_err(|e| FitrackError::Internal(format!("signing key derivation: {}", e)))?;

        Ok(SessionAuthorizer {
            key: HS256Key::from_bytes(&key_bytes),
            issuer: config.issuer.clone(),
            ttl: config.token_ttl,
            clock,
        })
    }

    /// Token validity window
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject`, valid from now until now + TTL
    pub fn issue(&self, subject: &str) -> Result<IssuedToken> {
        let issued_secs = unix_seconds(self.clock.now());
        let expires_secs = issued_secs
            .checked_add(self.ttl.as_secs())
            .ok_or_else(|| FitrackError::Internal("token expiry overflows".to_string()))?;
        let issued_at = to_system_time(issued_secs)?;
        let expires_at = to_system_time(expires_secs)?;

        let mut claims = Claims::create(JwtDuration::from_secs(self.ttl.as_secs()))
            .with_subject(subject)
            .with_issuer(&self.issuer);
        claims.issued_at = Some(JwtDuration::from_secs(issued_secs));
        claims.invalid_before = Some(JwtDuration::from_secs(issued_secs));
        claims.expires_at = Some(JwtDuration::from_secs(expires_secs));

        let token = self
            .key
            .authenticate(claims)
            .map_err(|e| FitrackError::Internal(format!("token signing failed: {}", e)))?;

        Ok(IssuedToken {
            token,
            subject: subject.to_string(),
            issued_at,
            expires_at,
        })
    }

    /// Verify a presented token and return its subject.
    ///
    /// Signature and issuer are verified first. The validity window is then checked
    /// against the verified claims, and only after that is the subject read. There
    /// is no clock tolerance: a token is expired as soon as `now > exp`.
    pub fn validate(&self, token: Option<&str>) -> std::result::Result<String, AuthError> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::Missing),
        };

        let options = VerificationOptions {
            allowed_issuers: Some(HashSet::from([self.issuer.clone()])),
            accept_future: true,
            time_tolerance: Some(JwtDuration::from_secs(LIBRARY_TIME_TOLERANCE_SECS)),
            ..Default::default()
        };

        let claims = self
            .key
            .verify_token::<NoCustomClaims>(token, Some(options))
            .map_err(|e| {
                debug!(error = %e, "session token rejected");
                AuthError::Malformed
            })?;

        let now_secs = unix_seconds(self.clock.now());
        let (Some(not_before), Some(expires_at)) = (claims.invalid_before, claims.expires_at)
        else {
            return Err(AuthError::Malformed);
        };
        if now_secs < not_before.as_secs() {
            debug!("session token used before its not-before time");
            return Err(AuthError::Malformed);
        }
        if now_secs > expires_at.as_secs() {
            return Err(AuthError::Expired);
        }

        claims
            .subject
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::Malformed)
    }
}

fn to_system_time(secs: u64) -> Result<SystemTime> {
    UNIX_EPOCH
        .checked_add(Duration::from_secs(secs))
        .ok_or_else(|| FitrackError::Internal(format!("timestamp {} out of range", secs)))
}

impl std::fmt::Debug for SessionAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthorizer")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
