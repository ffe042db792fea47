//! Error types for fitrack

use thiserror::Error;

pub use crate::auth::{AuthError, KdfError};

#[derive(Error, Debug)]
pub enum FitrackError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("User already exists: {email}")]
    UserExists { email: String },

    #[error("Profile already exists for user {user_id}")]
    ProfileExists { user_id: String },

    #[error("Profile not found for user {user_id}")]
    ProfileNotFound { user_id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Kdf(#[from] KdfError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
