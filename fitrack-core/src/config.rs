//! Authentication configuration
//!
//! Everything the credential and session components need is collected here and
//! handed to their constructors; nothing below reads the environment directly.

use std::fmt;
use std::time::Duration;

use crate::auth::KdfParams;
use crate::{FitrackError, Result};

/// Environment variable holding the token signing secret (required)
pub const ENV_SIGNING_SECRET: &str = "FITRACK_JWT_SECRET";

/// Environment variable overriding the token TTL in seconds (optional)
pub const ENV_TOKEN_TTL_SECS: &str = "FITRACK_TOKEN_TTL_SECS";

#[derive(Clone)]
pub struct AuthConfig {
    /// Symmetric secret the token MAC key is derived from. Required, no default.
    pub signing_secret: String,
    /// How long an issued token stays valid. Default: 7 days.
    pub token_ttl: Duration,
    /// `iss` claim stamped on and required of every token. Default: `fitrack`.
    pub issuer: String,
    /// Password KDF cost. Default: [`KdfParams::DEFAULT`]; not read from the environment.
    pub kdf: KdfParams,
}

impl AuthConfig {
    pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
    pub const DEFAULT_ISSUER: &'static str = "fitrack";

    /// Config with the given secret and defaults for everything else
    pub fn new(signing_secret: impl Into<String>) -> Self {
        AuthConfig {
            signing_secret: signing_secret.into(),
            token_ttl: Self::DEFAULT_TOKEN_TTL,
            issuer: Self::DEFAULT_ISSUER.to_string(),
            kdf: KdfParams::DEFAULT,
        }
    }

    /// Read the config from the process environment, failing if the secret is absent
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(ENV_SIGNING_SECRET)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FitrackError::Config(format!("{} is not set", ENV_SIGNING_SECRET)))?;

        let mut config = Self::new(secret);

        if let Some(raw) = lookup(ENV_TOKEN_TTL_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                FitrackError::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TOKEN_TTL_SECS, raw
                ))
            })?;
            config.token_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("issuer", &self.issuer)
            .field("kdf", &self.kdf)
            .finish()
    }
}
