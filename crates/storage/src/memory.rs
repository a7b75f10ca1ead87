//! In-memory record store

use crate::RecordStore;
use anyhow::Result;
use async_trait::async_trait;
use common::FileRecord;
use std::collections::HashMap;
use std::sync::Mutex;

/// Record store that lives only as long as the process
#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, FileRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStorage {
    async fn get(&self, identifier: &str) -> Result<Option<FileRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("Record map lock poisoned"))?;
        Ok(records.get(identifier).cloned())
    }

    async fn put(&self, identifier: &str, record: FileRecord) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("Record map lock poisoned"))?;
        if records.contains_key(identifier) {
            anyhow::bail!("Identifier {} already exists", identifier);
        }
        records.insert(identifier.to_string(), record);
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("Record map lock poisoned"))?;
        Ok(records.len())
    }
}
