//! High-level storage handle

use fitrack_core::*;
use std::path::Path;

use crate::{ProfileStore, StorageEngine, UserStore};

/// All stores sharing one keyspace
#[derive(Clone)]
pub struct Storage {
    engine: StorageEngine,
    users: UserStore,
    profiles: ProfileStore,
}

impl Storage {
    pub fn new(engine: StorageEngine) -> Result<Self> {
        Ok(Storage {
            users: UserStore::new(engine.clone())?,
            profiles: ProfileStore::new(engine.clone())?,
            engine,
        })
    }

    /// Open storage rooted at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(StorageEngine::new(path)?)
    }

    /// Create temporary storage for testing
    #[cfg(any(test, feature = "test-utils"))]
    pub fn temp() -> Result<(Self, tempfile::TempDir)> {
        let (engine, temp_dir) = StorageEngine::temp()?;
        Ok((Self::new(engine)?, temp_dir))
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn engine(&self) -> &StorageEngine {
        &self.engine
    }
}
