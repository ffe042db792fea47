//! Authentication for fitrack
//!
//! This module implements the two pieces every protected request goes through:
//! - Salted, memory-hard password credentials (Argon2id) with constant-time verification
//! - Stateless, signed session tokens (HS256 JWT) with a fixed validity window
//!
//! Neither component holds mutable state; both are safe to share across threads.

pub mod clock;
pub mod password;
pub mod session;
pub mod timing;

pub use clock::*;
pub use password::*;
pub use session::*;
pub use timing::*;
