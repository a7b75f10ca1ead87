pub mod backend;
pub mod filesystem;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use common::FileRecord;

pub use backend::StorageBackend;
pub use filesystem::FilesystemStorage;
pub use memory::MemoryStorage;

/// Durable mapping from opaque identifier to file record
///
/// Records are created once and never updated or removed. An identifier
/// that is not present is simply absent, never an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up the record stored under `identifier`
    async fn get(&self, identifier: &str) -> Result<Option<FileRecord>>;

    /// Store a new record and persist it before returning
    /// Fails if `identifier` is already taken
    async fn put(&self, identifier: &str, record: FileRecord) -> Result<()>;

    /// Number of stored records
    async fn len(&self) -> Result<usize>;
}
