//! Core data models, credentials and session tokens for fitrack

pub mod auth;
pub mod config;
pub mod error;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use config::*;
pub use error::*;
pub use types::*;

/// Result type alias for fitrack operations
pub type Result<T> = std::result::Result<T, FitrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalization() {
        let email = Email::new("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_validation() {
        // Valid addresses
        assert!(Email::new("a@b.co").is_ok());
        assert!(Email::new("first.last+tag@example.org").is_ok());

        // Invalid addresses
        assert!(Email::new("").is_err());
        assert!(Email::new("no-at-sign").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("user@").is_err());
        assert!(Email::new("user@@example.com").is_err());
        assert!(Email::new("user name@example.com").is_err());
    }

    #[test]
    fn test_user_id_roundtrip() {
        let id = UserId::new();
        let parsed = UserId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(UserId::parse("user-42").is_err());
    }
}
