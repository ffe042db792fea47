//! User accounts and their credentials
//!
//! Records live in the `users` partition under two key families:
//! `user:<id>` holds the JSON user record and `email:<address>` maps a
//! normalized email to its user id. Both are written in one batch.

use chrono::Utc;
use fjall::Partition;
use fitrack_core::*;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::{decode, storage_err, StorageEngine};

const PARTITION: &str = "users";

/// Store of registered users, one credential per user
#[derive(Clone)]
pub struct UserStore {
    partition: Partition,
    engine: StorageEngine,
    create_lock: Arc<Mutex<()>>,
}

impl UserStore {
    pub(crate) fn new(engine: StorageEngine) -> Result<Self> {
        Ok(UserStore {
            partition: engine.partition(PARTITION)?,
            engine,
            create_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Register a user. `credential` must already be the encoded salted hash.
    ///
    /// Fails with [`FitrackError::UserExists`] if the email is taken.
    pub fn create(&self, name: &str, email: &Email, credential: String) -> Result<User> {
        // Held across the existence check and the write so two signups for the
        // same address cannot both succeed.
        let _guard = self.create_lock.lock().unwrap_or_else(|e| e.into_inner());

        let email_key = email_key(email);
        if self.partition.get(&email_key).map_err(storage_err)?.is_some() {
            return Err(FitrackError::UserExists {
                email: email.to_string(),
            });
        }

        let user = User {
            id: UserId::new(),
            name: name.to_string(),
            email: email.clone(),
            credential,
            created_at: Utc::now(),
        };
        let user_json = serde_json::to_vec(&user)?;

        let mut batch = self.engine.keyspace().batch();
        batch.insert(&self.partition, user_key(&user.id), user_json);
        batch.insert(&self.partition, email_key, user.id.to_string());
        batch.commit().map_err(storage_err)?;
        self.engine.persist()?;

        debug!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Look a user up by id
    pub fn get(&self, id: &UserId) -> Result<Option<User>> {
        match self.partition.get(user_key(id)).map_err(storage_err)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Look a user up by (normalized) email
    pub fn find_by_email(&self, email: &Email) -> Result<Option<User>> {
        let Some(id_bytes) = self.partition.get(email_key(email)).map_err(storage_err)? else {
            return Ok(None);
        };

        let id = std::str::from_utf8(&id_bytes)
            .map_err(|e| FitrackError::Storage(format!("corrupt email index entry: {}", e)))?;
        let id = UserId::parse(id)?;

        match self.get(&id)? {
            Some(user) => Ok(Some(user)),
            None => Err(FitrackError::Storage(format!(
                "email index points at missing user {}",
                id
            ))),
        }
    }
}

fn user_key(id: &UserId) -> String {
    format!("user:{}", id)
}

fn email_key(email: &Email) -> String {
    format!("email:{}", email.as_str())
}
