//! Password credentials
//!
//! A credential is a random per-user salt plus a 32-byte key derived from the
//! password with Argon2id. It is stored as a single column value of the form
//! `<salt hex>.<derived key hex>`. Verification re-derives the key with the same
//! parameters and compares in constant time.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use thiserror::Error;
use tracing::warn;

use super::timing::constant_time_key_compare;

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl KdfParams {
    /// Production parameters: 19 MiB, 2 passes, 1 lane. Derivation takes
    /// on the order of tens of milliseconds on commodity hardware.
    pub const DEFAULT: KdfParams = KdfParams {
        memory_kib: 19 * 1024,
        iterations: 2,
        parallelism: 1,
    };

    /// Cheap parameters so tests can hash hundreds of passwords.
    /// Never use outside tests.
    #[cfg(any(test, feature = "test-utils"))]
    pub const FAST_INSECURE: KdfParams = KdfParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Key-derivation failures. These never depend on the password's content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdfError {
    #[error("random number generator failure: {0}")]
    Rng(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("invalid KDF parameters: {0}")]
    InvalidParams(String),
}

/// Decoded form of a stored credential record
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    salt: [u8; SALT_LEN],
    derived_key: [u8; KEY_LEN],
}

impl Credential {
    /// Encode as `<salt hex>.<derived key hex>`
    pub fn encode(&self) -> String {
        format!("{}.{}", hex::encode(self.salt), hex::encode(self.derived_key))
    }

    /// Parse a stored record. Any deviation from the exact encoded shape
    /// yields `None`.
    pub fn parse(record: &str) -> Option<Self> {
        let (salt_hex, key_hex) = record.split_once('.')?;

        let mut salt = [0u8; SALT_LEN];
        hex::decode_to_slice(salt_hex, &mut salt).ok()?;

        let mut derived_key = [0u8; KEY_LEN];
        hex::decode_to_slice(key_hex, &mut derived_key).ok()?;

        Some(Credential { salt, derived_key })
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("salt", &hex::encode(self.salt))
            .finish_non_exhaustive()
    }
}

/// Hashes and verifies passwords.
///
/// Both operations are CPU- and memory-bound; async callers should run them
/// on a blocking thread.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    params: KdfParams,
}

impl CredentialHasher {
    /// Create a hasher with fixed cost parameters
    pub fn new(params: KdfParams) -> Result<Self, KdfError> {
        let argon2_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| KdfError::InvalidParams(e.to_string()))?;

        Ok(CredentialHasher {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params),
            params,
        })
    }

    /// Cost parameters in use
    pub fn params(&self) -> KdfParams {
        self.params
    }

    /// Hash a password under a fresh random salt, returning the encoded record.
    ///
    /// An empty password is hashed like any other; rejecting it is the caller's job.
    pub fn hash(&self, password: &str) -> Result<String, KdfError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| KdfError::Rng(e.to_string()))?;

        let derived_key = self.derive(password, &salt)?;
        Ok(Credential { salt, derived_key }.encode())
    }

    /// Check a password against a stored record.
    ///
    /// A record that cannot be parsed is a mismatch, so corrupted credentials
    /// deny access.
    pub fn compare(&self, password: &str, stored: &str) -> Result<bool, KdfError> {
        let Some(credential) = Credential::parse(stored) else {
            warn!("stored credential record is unreadable, treating as mismatch");
            return Ok(false);
        };

        let candidate = self.derive(password, &credential.salt)?;
        Ok(constant_time_key_compare(&candidate, &credential.derived_key))
    }

    fn derive(&self, password: &str, salt: &[u8; SALT_LEN]) -> Result<[u8; KEY_LEN], KdfError> {
        let mut key = [0u8; KEY_LEN];
        self.argon2
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| KdfError::Derivation(e.to_string()))?;
        Ok(key)
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .finish()
    }
}
