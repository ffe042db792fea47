//! Persistence for fitrack, built on a fjall keyspace

use fjall::{Config, Keyspace, Partition, PartitionCreateOptions, PersistMode};
use fitrack_core::*;
use std::path::Path;
use std::sync::Arc;

pub mod profiles;
pub mod storage;
pub mod users;

pub use profiles::*;
pub use storage::*;
pub use users::*;

/// Storage engine wrapping a fjall keyspace
#[derive(Clone)]
pub struct StorageEngine {
    keyspace: Arc<Keyspace>,
}

impl StorageEngine {
    /// Open (or create) the storage engine at the given path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let keyspace = Config::new(path)
            .open()
            .map_err(|e| FitrackError::Storage(e.to_string()))?;

        Ok(StorageEngine {
            keyspace: Arc::new(keyspace),
        })
    }

    /// Create temporary storage engine for testing
    #[cfg(any(test, feature = "test-utils"))]
    pub fn temp() -> Result<(Self, tempfile::TempDir)> {
        let temp_dir = tempfile::tempdir()?;
        let engine = Self::new(temp_dir.path())?;
        Ok((engine, temp_dir))
    }

    /// Open (or create) a named partition
    pub(crate) fn partition(&self, name: &str) -> Result<Partition> {
        self.keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .map_err(|e| FitrackError::Storage(e.to_string()))
    }

    pub(crate) fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    /// Persist all changes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(|e| FitrackError::Storage(e.to_string()))
    }
}

/// Decode a JSON record read from a partition
pub(crate) fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(FitrackError::Serialization)
}

pub(crate) fn storage_err(e: impl std::fmt::Display) -> FitrackError {
    FitrackError::Storage(e.to_string())
}
