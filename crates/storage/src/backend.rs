use crate::{FilesystemStorage, MemoryStorage, RecordStore};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Storage backend type
pub enum StorageBackend {
    /// JSON record file at the given path
    File(PathBuf),
    /// Process-local map, lost on exit
    Memory,
}

impl StorageBackend {
    /// Initialize storage backend based on type
    pub async fn initialize(self) -> Result<Arc<dyn RecordStore>> {
        match self {
            StorageBackend::File(path) => {
                let storage = FilesystemStorage::open(path).await?;
                Ok(Arc::new(storage))
            }
            StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        }
    }
}
