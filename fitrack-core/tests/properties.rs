//! Property-based tests for fitrack credentials and session tokens

use fitrack_core::auth::*;
use fitrack_core::AuthConfig;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const SECRET: &str = "property-test-signing-secret-0123456789";

fn hasher() -> CredentialHasher {
    CredentialHasher::new(KdfParams::FAST_INSECURE).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn props_password_verifies_against_own_hash(password in ".{0,64}") {
        let hasher = hasher();
        let record = hasher.hash(&password).unwrap();
        prop_assert!(hasher.compare(&password, &record).unwrap());
    }

    #[test]
    fn props_other_password_does_not_verify(
        (first, second) in (".{0,32}", ".{0,32}").prop_filter("distinct", |(a, b)| a != b)
    ) {
        let hasher = hasher();
        let record = hasher.hash(&first).unwrap();
        prop_assert!(!hasher.compare(&second, &record).unwrap());
    }

    #[test]
    fn props_rehashing_uses_fresh_salt(password in ".{0,32}") {
        let hasher = hasher();
        let first = hasher.hash(&password).unwrap();
        let second = hasher.hash(&password).unwrap();
        prop_assert_ne!(&first, &second);
        prop_assert!(hasher.compare(&password, &first).unwrap());
        prop_assert!(hasher.compare(&password, &second).unwrap());
    }

    #[test]
    fn props_arbitrary_records_never_panic(record in ".{0,128}") {
        // Arbitrary text is either unparseable (a mismatch) or, astronomically
        // unlikely, a valid record for some other password.
        let _ = hasher().compare("password", &record).unwrap();
    }

    #[test]
    fn props_issued_token_validates_to_subject(subject in "[a-zA-Z0-9_-]{1,40}") {
        let authorizer = SessionAuthorizer::new(&AuthConfig::new(SECRET)).unwrap();
        let issued = authorizer.issue(&subject).unwrap();
        prop_assert_eq!(authorizer.validate(Some(&issued.token)), Ok(subject));
    }

    #[test]
    fn props_token_valid_until_exactly_ttl(elapsed in 0u64..=120) {
        let clock = Arc::new(ManualClock::starting_now());
        let config = AuthConfig::new(SECRET).with_token_ttl(Duration::from_secs(60));
        let authorizer = SessionAuthorizer::with_clock(&config, clock.clone()).unwrap();
        let issued = authorizer.issue("user-42").unwrap();

        clock.advance(Duration::from_secs(elapsed));
        let result = authorizer.validate(Some(&issued.token));
        if elapsed <= 60 {
            prop_assert_eq!(result, Ok("user-42".to_string()));
        } else {
            prop_assert_eq!(result, Err(AuthError::Expired));
        }
    }

    #[test]
    fn props_truncated_tokens_are_rejected(cut in 1usize..20) {
        let authorizer = SessionAuthorizer::new(&AuthConfig::new(SECRET)).unwrap();
        let issued = authorizer.issue("user-42").unwrap();
        let truncated = &issued.token[..issued.token.len() - cut];
        prop_assert_eq!(authorizer.validate(Some(truncated)), Err(AuthError::Malformed));
    }
}
