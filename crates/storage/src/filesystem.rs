//! JSON file backed record store

mod document;

use crate::RecordStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use common::FileRecord;
use document::{sibling_path, RecordDocument, Records};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Record store persisted as a single JSON document.
///
/// The whole mapping is loaded when the store is opened and rewritten on
/// every `put`. An exclusive lock on `<path>.lock` is held for the lifetime
/// of the store so a second process cannot write the same file.
pub struct FilesystemStorage {
    path: PathBuf,
    records: Mutex<Records>,
    _lock: File,
}

impl FilesystemStorage {
    /// Open the store at `path`, creating an empty one if the file does not exist
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let lock = acquire_lock(&path)?;

        let records = match RecordDocument::load(&path).await? {
            Some(records) => records,
            None => {
                info!(path = ?path, "No record file found, starting empty");
                Records::new()
            }
        };

        info!(path = ?path, records = records.len(), "Record store loaded");

        Ok(Self {
            path,
            records: Mutex::new(records),
            _lock: lock,
        })
    }
}

fn acquire_lock(path: &Path) -> Result<File> {
    let lock_path = sibling_path(path, ".lock");
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to open lock file {:?}", lock_path))?;

    file.try_lock_exclusive()
        .with_context(|| format!("Record file {:?} is in use by another process", path))?;

    Ok(file)
}

#[async_trait]
impl RecordStore for FilesystemStorage {
    async fn get(&self, identifier: &str) -> Result<Option<FileRecord>> {
        let records = self.records.lock().await;
        Ok(records.get(identifier).cloned())
    }

    async fn put(&self, identifier: &str, record: FileRecord) -> Result<()> {
        // Held across the save so concurrent puts cannot lose each other's writes
        let mut records = self.records.lock().await;

        if records.contains_key(identifier) {
            anyhow::bail!("Identifier {} already exists", identifier);
        }

        records.insert(identifier.to_string(), record);
        if let Err(e) = RecordDocument::save_atomic(&self.path, &records).await {
            records.remove(identifier);
            warn!(identifier = %identifier, "Record not persisted, rolled back");
            return Err(e);
        }

        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.lock().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(original: &str, url: &str) -> FileRecord {
        FileRecord {
            original_name: original.to_string(),
            obfuscated_name: "a1b2c3d4e5.txt".to_string(),
            remote_url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_starts_empty_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path().join("files.json"))
            .await
            .unwrap();

        assert_eq!(store.len().await.unwrap(), 0);
        assert!(store.get("doesnotexist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files.json");

        {
            let store = FilesystemStorage::open(&path).await.unwrap();
            store
                .put("0123456789ab", record("a.txt", "https://h/1.txt"))
                .await
                .unwrap();
            assert!(path.exists());
        }

        let reopened = FilesystemStorage::open(&path).await.unwrap();
        assert_eq!(reopened.len().await.unwrap(), 1);
        assert_eq!(
            reopened.get("0123456789ab").await.unwrap(),
            Some(record("a.txt", "https://h/1.txt"))
        );
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("files.json");

        let store = FilesystemStorage::open(&path).await.unwrap();
        store
            .put("0123456789ab", record("a.txt", "https://h/1.txt"))
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_malformed_file_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(FilesystemStorage::open(&path).await.is_err());
        // Nothing was overwritten
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1, 2, 3]");
    }

    #[tokio::test]
    async fn test_duplicate_identifier_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path().join("files.json"))
            .await
            .unwrap();

        store
            .put("0123456789ab", record("a.txt", "https://h/1.txt"))
            .await
            .unwrap();
        let result = store
            .put("0123456789ab", record("b.txt", "https://h/2.txt"))
            .await;

        assert!(result.is_err());
        assert_eq!(
            store.get("0123456789ab").await.unwrap().unwrap().original_name,
            "a.txt"
        );
    }

    #[tokio::test]
    async fn test_failed_save_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files.json");
        let store = FilesystemStorage::open(&path).await.unwrap();
        store
            .put("0123456789ab", record("a.txt", "https://h/1.txt"))
            .await
            .unwrap();

        // A directory where the temp file goes makes the next save fail
        let blocker = sibling_path(&path, ".tmp");
        std::fs::create_dir(&blocker).unwrap();

        let result = store
            .put("ba9876543210", record("b.txt", "https://h/2.txt"))
            .await;
        assert!(result.is_err());
        assert!(store.get("ba9876543210").await.unwrap().is_none());
        assert_eq!(store.len().await.unwrap(), 1);
        let on_disk = RecordDocument::load(&path).await.unwrap().unwrap();
        assert_eq!(on_disk.len(), 1);

        // The rolled back identifier is free again once saving works
        std::fs::remove_dir(&blocker).unwrap();
        store
            .put("ba9876543210", record("b.txt", "https://h/2.txt"))
            .await
            .unwrap();
        assert_eq!(store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_second_open_is_locked_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files.json");

        let _first = FilesystemStorage::open(&path).await.unwrap();
        assert!(FilesystemStorage::open(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_puts_are_all_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files.json");
        let store = Arc::new(FilesystemStorage::open(&path).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .put(
                        &format!("{:012x}", i),
                        record(&format!("{}.txt", i), &format!("https://h/{}", i)),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let on_disk = RecordDocument::load(&path).await.unwrap().unwrap();
        assert_eq!(on_disk.len(), 16);
    }
}
