//! Shared per-server state handed to every request

use fitrack_core::auth::{CredentialHasher, SessionAuthorizer};
use fitrack_core::{AuthConfig, Result};
use fitrack_engine::Storage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub hasher: CredentialHasher,
    pub authorizer: Arc<SessionAuthorizer>,
    /// Credential for an unknown password, compared against on signin for
    /// unknown emails so both failure paths cost one derivation.
    pub(crate) dummy_credential: Arc<str>,
}

impl AppState {
    pub fn new(storage: Storage, config: &AuthConfig) -> Result<Self> {
        let hasher = CredentialHasher::new(config.kdf)?;
        let authorizer = SessionAuthorizer::new(config)?;
        let dummy_credential = hasher.hash("fitrack-signin-placeholder")?;

        Ok(AppState {
            storage,
            hasher,
            authorizer: Arc::new(authorizer),
            dummy_credential: dummy_credential.into(),
        })
    }

    pub fn with_authorizer(mut self, authorizer: SessionAuthorizer) -> Self {
        self.authorizer = Arc::new(authorizer);
        self
    }
}
