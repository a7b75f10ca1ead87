use anyhow::{Context, Result};
use common::FileRecord;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Identifier -> record, in the order it is written to disk
pub type Records = BTreeMap<String, FileRecord>;

/// JSON document holding every record
pub struct RecordDocument;

impl RecordDocument {
    /// Load the document, `None` if it does not exist yet
    pub async fn load(path: &Path) -> Result<Option<Records>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read record file {:?}", path))
            }
        };

        let records = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse record file {:?}", path))?;
        Ok(Some(records))
    }

    /// Replace the document with `records`.
    ///
    /// Writes a sibling temp file, syncs it to disk and renames it over the
    /// target, so readers only ever see a complete document.
    pub async fn save_atomic(path: &Path, records: &Records) -> Result<()> {
        let json =
            serde_json::to_string_pretty(records).context("Failed to serialize records")?;

        let temp_path = sibling_path(path, ".tmp");
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create {:?}", temp_path))?;

        file.write_all(json.as_bytes())
            .await
            .context("Failed to write records to temp file")?;

        file.sync_all()
            .await
            .context("Failed to sync record file to disk")?;
        drop(file);

        tokio::fs::rename(&temp_path, path)
            .await
            .with_context(|| format!("Failed to move {:?} into place", temp_path))?;

        Ok(())
    }
}

/// `path` with `suffix` appended to its file name
pub(crate) fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
